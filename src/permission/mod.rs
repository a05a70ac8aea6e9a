//! Authorization seam for tag operations.
//!
//! The tag engine never decides on its own who may see or edit tags. It
//! asks a [`PermissionPolicy`] supplied by the host.

mod grants;
mod policy;

pub use grants::GrantTable;
pub use policy::{AllowAll, PermissionPolicy, Requester, TagAction};

#[cfg(test)]
#[path = "../permission_tests.rs"]
mod permission_tests;
