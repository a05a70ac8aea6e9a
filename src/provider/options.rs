use crate::config::TagsConfig;
use crate::tag::ResourceFilter;

/// Realm-specific behaviour of a [`DefaultTagProvider`](super::DefaultTagProvider).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Record every tag change in the change log.
    pub revisable: bool,
    /// Allow realm-level permission checks when the policy is default.
    pub fast_permission_check: bool,
    /// Ids never reported by this realm.
    pub filter: ResourceFilter,
}

impl ProviderOptions {
    /// Options for `realm` as configured in `config`.
    #[must_use]
    pub fn for_realm(config: &TagsConfig, realm: &str) -> Self {
        Self {
            revisable: config.is_revisable(realm),
            fast_permission_check: config.fast_permission_check,
            filter: config.filter_for(realm),
        }
    }
}
