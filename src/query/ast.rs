use crate::tag::TagSet;
use std::fmt;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// Matches resources carrying the tag.
    Literal(String),
    /// `key:value`, decided by the handler registered for `key`.
    Attribute { key: String, value: String },
    /// All children match. Empty matches everything.
    And(Vec<QueryNode>),
    /// Any child matches. Empty matches nothing.
    Or(Vec<QueryNode>),
    Not(Box<QueryNode>),
}

impl QueryNode {
    /// Every literal tag mentioned anywhere in the tree, negated ones included.
    #[must_use]
    pub fn terms(&self) -> TagSet {
        let mut terms = TagSet::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms(&self, terms: &mut TagSet) {
        match self {
            Self::Literal(tag) => {
                terms.insert(tag.clone());
            }
            Self::Attribute { .. } => {}
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_terms(terms);
                }
            }
            Self::Not(child) => child.collect_terms(terms),
        }
    }

    /// Tags a matching resource must carry at least one of.
    ///
    /// `None` means no such guarantee exists and every resource of a realm
    /// has to be considered. The result never excludes a true match: a
    /// conjunction picks its narrowest guaranteed child, a disjunction only
    /// narrows when every branch does, and negations or attributes never
    /// narrow.
    #[must_use]
    pub fn required_tags(&self) -> Option<TagSet> {
        match self {
            Self::Literal(tag) => Some(std::iter::once(tag.clone()).collect()),
            Self::Attribute { .. } | Self::Not(_) => None,
            Self::And(children) => children
                .iter()
                .filter_map(Self::required_tags)
                .min_by_key(TagSet::len),
            Self::Or(children) => {
                if children.is_empty() {
                    return Some(TagSet::new());
                }
                let mut union = TagSet::new();
                for child in children {
                    union.extend(child.required_tags()?);
                }
                Some(union)
            }
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            Self::And(children) | Self::Or(children) => children.len() > 1,
            Self::Literal(_) | Self::Attribute { .. } | Self::Not(_) => false,
        }
    }
}

/// Whether `word` reads back as one bare word when left unquoted.
fn is_bare_word(word: &str) -> bool {
    !word.is_empty()
        && word != "or"
        && word != "not"
        && !word
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')'))
}

/// Literals additionally must not look like a negation or an attribute.
fn is_bare_literal(word: &str) -> bool {
    is_bare_word(word) && !word.starts_with('-') && !word.contains(':')
}

fn write_word(f: &mut fmt::Formatter<'_>, word: &str, bare: bool) -> fmt::Result {
    if bare {
        write!(f, "{word}")
    } else if word.contains('"') {
        write!(f, "'{word}'")
    } else {
        write!(f, "\"{word}\"")
    }
}

/// Canonical form: reparsing it yields an equivalent tree.
impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(tag) => write_word(f, tag, is_bare_literal(tag)),
            Self::Attribute { key, value } => {
                write!(f, "{key}:")?;
                write_word(f, value, is_bare_word(value))
            }
            Self::And(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    if matches!(child, Self::Or(_)) && child.is_compound() {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                Ok(())
            }
            Self::Or(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Self::Not(child) => {
                if child.is_compound() {
                    write!(f, "-({child})")
                } else {
                    write!(f, "-{child}")
                }
            }
        }
    }
}
