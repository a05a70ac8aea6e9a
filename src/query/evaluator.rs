use super::{AttributeHandlers, QueryNode};
use crate::tag::{Resource, TagError, TagSet};

/// Decide whether a resource with `tags` satisfies `node`.
///
/// `context` is the resource under test, passed to attribute handlers.
///
/// # Errors
///
/// Returns [`TagError::InvalidQuery`] when an attribute has no handler.
pub fn evaluate(
    node: &QueryNode,
    tags: &TagSet,
    context: &Resource,
    handlers: &AttributeHandlers,
) -> Result<bool, TagError> {
    match node {
        QueryNode::Literal(tag) => Ok(tags.contains(tag)),
        QueryNode::Attribute { key, value } => handlers
            .get(key)
            .map(|handler| handler(value, node, context))
            .ok_or_else(|| TagError::InvalidQuery(format!("unknown attribute '{key}'"))),
        QueryNode::And(children) => {
            for child in children {
                if !evaluate(child, tags, context, handlers)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        QueryNode::Or(children) => {
            for child in children {
                if evaluate(child, tags, context, handlers)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        QueryNode::Not(child) => Ok(!evaluate(child, tags, context, handlers)?),
    }
}
