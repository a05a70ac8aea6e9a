//! Boolean tag queries.
//!
//! A query string is parsed into a [`QueryNode`] tree by a pest grammar,
//! then evaluated against a resource's tag set. Attribute predicates such
//! as `realm:wiki` are resolved through an [`AttributeHandlers`] table.

mod ast;
mod compiled;
mod evaluator;
mod handlers;
mod parser;

pub use ast::QueryNode;
pub use compiled::Query;
pub use evaluator::evaluate;
pub use handlers::{AttributeHandler, AttributeHandlers, REALM_ATTRIBUTE};
pub use parser::parse_query;

#[cfg(test)]
#[path = "../query_tests.rs"]
mod query_tests;
