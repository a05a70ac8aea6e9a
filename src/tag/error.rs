use super::Resource;
use crate::permission::TagAction;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the tagging API.
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Invalid tag query: {0}")]
    InvalidQuery(String),

    #[error("Tags are not supported on the '{0}' realm")]
    InvalidTagRealm(String),

    #[error("Realm '{0}' already has a tag provider")]
    DuplicateRealm(String),

    #[error("{username} is not allowed to {action} tags of {resource}")]
    PermissionDenied {
        action: TagAction,
        resource: Resource,
        username: String,
    },

    #[error("Resource '{0}' does not exist")]
    ResourceNotFound(Resource),

    #[error("Tags can't be moved from realm '{from}' to realm '{to}'")]
    CrossRealmMove { from: String, to: String },

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Tag store error: {0}")]
    Store(#[from] StoreError),
}
