//! Table-driven policy: realm-wide grants plus per-resource denials.

use super::{PermissionPolicy, Requester, TagAction};
use crate::tag::Resource;
use std::collections::{HashMap, HashSet};

/// Username that matches every requester.
const EVERYONE: &str = "*";
/// Pseudo-user standing for every logged-in requester.
const AUTHENTICATED: &str = "authenticated";

/// A [`PermissionPolicy`] built from explicit grants.
///
/// `Modify` implies `View`. A realm grant of `None` covers every realm.
/// Denials on single resources override grants, and any denial makes the
/// policy non-default.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: HashMap<String, HashSet<(Option<String>, TagAction)>>,
    denials: HashSet<(String, Resource, TagAction)>,
}

impl GrantTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock setup: anonymous users view, everyone else modifies.
    #[must_use]
    pub fn stock() -> Self {
        Self::new()
            .grant(EVERYONE, None, TagAction::View)
            .grant_authenticated(None, TagAction::Modify)
    }

    #[must_use]
    pub fn grant(mut self, username: &str, realm: Option<&str>, action: TagAction) -> Self {
        self.grants
            .entry(username.to_owned())
            .or_default()
            .insert((realm.map(str::to_owned), action));
        self
    }

    /// Grant to every requester except the anonymous one.
    #[must_use]
    pub fn grant_authenticated(self, realm: Option<&str>, action: TagAction) -> Self {
        self.grant(AUTHENTICATED, realm, action)
    }

    #[must_use]
    pub fn deny(mut self, username: &str, resource: Resource, action: TagAction) -> Self {
        self.denials.insert((username.to_owned(), resource, action));
        self
    }

    fn denied(&self, username: &str, resource: &Resource, action: TagAction) -> bool {
        [username, EVERYONE].iter().any(|who| {
            self.denials
                .contains(&((*who).to_owned(), resource.clone(), action))
        })
    }

    fn granted(&self, username: &str, realm: &str, action: TagAction) -> bool {
        let mut principals = vec![username, EVERYONE];
        if username != Requester::ANONYMOUS {
            principals.push(AUTHENTICATED);
        }
        principals.iter().any(|who| {
            self.grants.get(*who).is_some_and(|entries| {
                entries.iter().any(|(scope, granted)| {
                    let realm_ok = scope.as_deref().map_or(true, |r| r == realm);
                    let action_ok = *granted == action
                        || (*granted == TagAction::Modify && action == TagAction::View);
                    realm_ok && action_ok
                })
            })
        })
    }
}

impl PermissionPolicy for GrantTable {
    fn authorized(&self, username: &str, resource: &Resource, action: TagAction) -> bool {
        if self.denied(username, resource, action) {
            return false;
        }
        // Hidden resources can't be edited either.
        if action == TagAction::Modify && self.denied(username, resource, TagAction::View) {
            return false;
        }
        self.granted(username, &resource.realm, action)
    }

    fn is_default(&self) -> bool {
        self.denials.is_empty()
    }
}
