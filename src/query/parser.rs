use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::{AttributeHandlers, QueryNode};
use crate::tag::TagError;

#[derive(Parser)]
#[grammar = "query/grammar.pest"]
struct QueryGrammar;

/// Parse a query string into a [`QueryNode`] tree.
///
/// Blank input yields an empty conjunction, which matches every resource.
///
/// # Errors
///
/// Returns [`TagError::InvalidQuery`] on syntax errors, unbalanced quotes,
/// empty quoted terms and attributes without a handler in `handlers`.
pub fn parse_query(input: &str, handlers: &AttributeHandlers) -> Result<QueryNode, TagError> {
    let mut pairs = QueryGrammar::parse(Rule::query, input)
        .map_err(|e| TagError::InvalidQuery(format!("{e}")))?;
    let query = pairs
        .next()
        .ok_or_else(|| TagError::InvalidQuery("Empty parse result".to_owned()))?;

    match query.into_inner().find(|pair| pair.as_rule() == Rule::expr) {
        Some(expr) => build_expr(expr, handlers),
        None => Ok(QueryNode::And(Vec::new())),
    }
}

fn unexpected(pair: &Pair<'_, Rule>) -> TagError {
    TagError::InvalidQuery(format!(
        "Unexpected {:?} at '{}'",
        pair.as_rule(),
        pair.as_str()
    ))
}

/// Collapse single-child groups so `a` parses to a literal, not `And([a])`.
fn group(mut children: Vec<QueryNode>, wrap: fn(Vec<QueryNode>) -> QueryNode) -> QueryNode {
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return only;
        }
    }
    wrap(children)
}

fn build_expr(pair: Pair<'_, Rule>, handlers: &AttributeHandlers) -> Result<QueryNode, TagError> {
    let branches = pair
        .into_inner()
        .filter(|inner| inner.as_rule() != Rule::or_kw)
        .map(|and_expr| build_and(and_expr, handlers))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(group(branches, QueryNode::Or))
}

fn build_and(pair: Pair<'_, Rule>, handlers: &AttributeHandlers) -> Result<QueryNode, TagError> {
    if pair.as_rule() != Rule::and_expr {
        return Err(unexpected(&pair));
    }
    let terms = pair
        .into_inner()
        .map(|unary| build_unary(unary, handlers))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(group(terms, QueryNode::And))
}

fn build_unary(pair: Pair<'_, Rule>, handlers: &AttributeHandlers) -> Result<QueryNode, TagError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| TagError::InvalidQuery("Expected a term".to_owned()))?;
    match first.as_rule() {
        Rule::not_op => {
            let operand = inner
                .next()
                .ok_or_else(|| TagError::InvalidQuery("Expected a term after negation".to_owned()))?;
            Ok(QueryNode::Not(Box::new(build_unary(operand, handlers)?)))
        }
        Rule::primary => build_primary(first, handlers),
        _ => Err(unexpected(&first)),
    }
}

fn build_primary(pair: Pair<'_, Rule>, handlers: &AttributeHandlers) -> Result<QueryNode, TagError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| TagError::InvalidQuery("Expected a term".to_owned()))?;
    match inner.as_rule() {
        Rule::expr => build_expr(inner, handlers),
        Rule::attribute => build_attribute(inner, handlers),
        Rule::literal => Ok(QueryNode::Literal(word(inner)?)),
        _ => Err(unexpected(&inner)),
    }
}

fn build_attribute(
    pair: Pair<'_, Rule>,
    handlers: &AttributeHandlers,
) -> Result<QueryNode, TagError> {
    let mut inner = pair.into_inner();
    let (Some(key), Some(value)) = (inner.next(), inner.next()) else {
        return Err(TagError::InvalidQuery("Malformed attribute".to_owned()));
    };
    let key_name = key.as_str();
    if !handlers.contains(key_name) {
        return Err(TagError::InvalidQuery(format!(
            "unknown attribute '{key_name}'"
        )));
    }
    Ok(QueryNode::Attribute {
        key: key_name.to_owned(),
        value: word(value)?,
    })
}

/// Text of a bare word or of the inside of a quoted string, trimmed.
fn word(pair: Pair<'_, Rule>) -> Result<String, TagError> {
    let token = pair
        .into_inner()
        .next()
        .ok_or_else(|| TagError::InvalidQuery("Expected a word".to_owned()))?;
    let text = match token.as_rule() {
        Rule::bare_word => token.as_str(),
        Rule::quoted => token
            .into_inner()
            .next()
            .map_or("", |quoted_text| quoted_text.as_str()),
        _ => return Err(unexpected(&token)),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TagError::InvalidQuery("empty quoted term".to_owned()));
    }
    Ok(trimmed.to_owned())
}
