use crate::tag::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a requester wants to do with tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagAction {
    View,
    Modify,
}

impl fmt::Display for TagAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Modify => write!(f, "modify"),
        }
    }
}

/// The principal on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requester {
    pub username: String,
}

impl Requester {
    pub const ANONYMOUS: &'static str = "anonymous";

    #[must_use]
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self {
            username: username.into(),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.username == Self::ANONYMOUS
    }
}

/// Answers "may `username` perform `action` on `resource`?".
///
/// A realm-level check passes a resource whose id is empty.
pub trait PermissionPolicy: Send + Sync {
    fn authorized(&self, username: &str, resource: &Resource, action: TagAction) -> bool;

    /// True when the policy carries no per-resource rules, so a realm-level
    /// answer holds for every resource in the realm.
    fn is_default(&self) -> bool {
        false
    }
}

/// Grants everything to everyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionPolicy for AllowAll {
    fn authorized(&self, _username: &str, _resource: &Resource, _action: TagAction) -> bool {
        true
    }

    fn is_default(&self) -> bool {
        true
    }
}
