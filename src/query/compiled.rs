use super::{evaluate, parse_query, AttributeHandlers, QueryNode};
use crate::tag::{Resource, TagError, TagSet};
use std::fmt;

/// A parsed, immutable query together with the handlers it was checked
/// against.
#[derive(Debug, Clone)]
pub struct Query {
    root: QueryNode,
    handlers: AttributeHandlers,
    terms: TagSet,
    canonical: String,
}

impl Query {
    /// Parse `text`, accepting the attributes in `handlers`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidQuery`] if `text` is malformed.
    pub fn parse(text: &str, handlers: AttributeHandlers) -> Result<Self, TagError> {
        let root = parse_query(text, &handlers)?;
        let terms = root.terms();
        let canonical = root.to_string();
        Ok(Self {
            root,
            handlers,
            terms,
            canonical,
        })
    }

    /// Parse `text` with only the built-in `realm` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidQuery`] if `text` is malformed.
    pub fn with_default_handlers(text: &str) -> Result<Self, TagError> {
        Self::parse(text, AttributeHandlers::with_defaults())
    }

    #[must_use]
    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// Every literal tag in the query.
    #[must_use]
    pub fn terms(&self) -> &TagSet {
        &self.terms
    }

    #[must_use]
    pub fn as_string(&self) -> &str {
        &self.canonical
    }

    /// See [`QueryNode::required_tags`].
    #[must_use]
    pub fn prefetch_tags(&self) -> Option<TagSet> {
        self.root.required_tags()
    }

    /// # Errors
    ///
    /// Returns [`TagError::InvalidQuery`] when an attribute lost its handler.
    pub fn matches(&self, tags: &TagSet, context: &Resource) -> Result<bool, TagError> {
        evaluate(&self.root, tags, context, &self.handlers)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
