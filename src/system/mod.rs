//! The realm-spanning tagging facade.

mod scope;
mod tag_system;

pub use scope::scan_realms;
pub use tag_system::{ReplaceSummary, TagSystem};

#[cfg(test)]
#[path = "../system_tests.rs"]
mod system_tests;
