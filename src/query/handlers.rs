//! Attribute predicates such as `realm:wiki`.

use super::QueryNode;
use crate::tag::Resource;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The attribute every query understands.
pub const REALM_ATTRIBUTE: &str = "realm";

/// Decides an attribute node for a candidate resource.
///
/// Receives the attribute value, the node itself and the resource being
/// tested.
pub type AttributeHandler = Arc<dyn Fn(&str, &QueryNode, &Resource) -> bool + Send + Sync>;

/// Table of attribute handlers keyed by attribute name.
#[derive(Clone)]
pub struct AttributeHandlers {
    handlers: HashMap<String, AttributeHandler>,
}

impl AttributeHandlers {
    /// An empty table, without even the `realm` handler.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The table every query starts from: just `realm`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let realm: AttributeHandler =
            Arc::new(|value: &str, _node: &QueryNode, resource: &Resource| resource.realm == value);
        let mut table = Self::empty();
        table.insert(REALM_ATTRIBUTE, realm);
        table
    }

    pub fn insert<S: Into<String>>(&mut self, key: S, handler: AttributeHandler) {
        self.handlers.insert(key.into(), handler);
    }

    /// Add every handler of `other`, replacing same-named ones.
    pub fn extend(&mut self, other: &Self) {
        for (key, handler) in &other.handlers {
            self.handlers.insert(key.clone(), Arc::clone(handler));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeHandler> {
        self.handlers.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered attribute names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for AttributeHandlers {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for AttributeHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeHandlers")
            .field("keys", &self.keys())
            .finish()
    }
}
