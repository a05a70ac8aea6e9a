use super::*;
use crate::tag::{split_into_tags, Resource, TagError, TagSet};
use std::sync::Arc;

fn parse(text: &str) -> QueryNode {
    parse_query(text, &AttributeHandlers::with_defaults()).unwrap()
}

fn lit(tag: &str) -> QueryNode {
    QueryNode::Literal(tag.to_owned())
}

fn matches(text: &str, tags: &str) -> bool {
    let query = Query::with_default_handlers(text).unwrap();
    query
        .matches(&split_into_tags(tags), &Resource::new("wiki", "Page"))
        .unwrap()
}

#[test]
fn test_juxtaposition_is_and() {
    assert_eq!(parse("a b"), QueryNode::And(vec![lit("a"), lit("b")]));
}

#[test]
fn test_or_binds_looser_than_and() {
    assert_eq!(
        parse("a b or c"),
        QueryNode::Or(vec![QueryNode::And(vec![lit("a"), lit("b")]), lit("c")])
    );
}

#[test]
fn test_negation_forms() {
    let expected = QueryNode::Not(Box::new(lit("a")));
    assert_eq!(parse("-a"), expected);
    assert_eq!(parse("not a"), expected);
    assert_eq!(parse("nothing"), lit("nothing"));
}

#[test]
fn test_keywords_need_a_boundary() {
    let either = QueryNode::Or(vec![lit("a"), lit("b")]);
    assert_eq!(parse("a or b"), either);
    assert_eq!(parse("a or(b)"), either);
    assert_eq!(parse("(a or b)"), either);
    assert_eq!(parse("a\tor\nb"), either);
    assert_eq!(parse("not(a)"), QueryNode::Not(Box::new(lit("a"))));
    assert_eq!(
        parse("not not a"),
        QueryNode::Not(Box::new(QueryNode::Not(Box::new(lit("a")))))
    );
    assert_eq!(parse("orange"), lit("orange"));
    assert_eq!(parse("a orange"), QueryNode::And(vec![lit("a"), lit("orange")]));
    assert_eq!(
        parse("notes or nothing"),
        QueryNode::Or(vec![lit("notes"), lit("nothing")])
    );
    assert_eq!(
        parse("'not' or \"or\""),
        QueryNode::Or(vec![lit("not"), lit("or")])
    );
}

#[test]
fn test_dangling_keywords_are_rejected() {
    let handlers = AttributeHandlers::with_defaults();
    for text in ["a or", "or a", "a or or b", "not", "a not", "(not)", "a or ()"] {
        assert!(
            matches!(parse_query(text, &handlers), Err(TagError::InvalidQuery(_))),
            "expected InvalidQuery for {text:?}"
        );
    }
}

#[test]
fn test_quoted_literals_keep_spaces() {
    assert_eq!(parse("\"two words\""), lit("two words"));
    assert_eq!(parse("'say \"hi\"'"), lit("say \"hi\""));
    assert_eq!(parse("\"or\""), lit("or"));
}

#[test]
fn test_parentheses_group() {
    assert_eq!(
        parse("(a or b) c"),
        QueryNode::And(vec![QueryNode::Or(vec![lit("a"), lit("b")]), lit("c")])
    );
}

#[test]
fn test_realm_attribute() {
    assert_eq!(
        parse("realm:wiki a"),
        QueryNode::And(vec![
            QueryNode::Attribute {
                key: "realm".to_owned(),
                value: "wiki".to_owned(),
            },
            lit("a"),
        ])
    );
}

#[test]
fn test_blank_query_is_empty_and() {
    assert_eq!(parse(""), QueryNode::And(Vec::new()));
    assert_eq!(parse("   "), QueryNode::And(Vec::new()));
    assert!(matches("", "anything"));
    assert!(matches("", ""));
}

#[test]
fn test_invalid_queries() {
    let handlers = AttributeHandlers::with_defaults();
    for text in ["\"open", "'open", "a or", "(a b", "a)", "color:red", "\"\"", "not"] {
        let result = parse_query(text, &handlers);
        assert!(
            matches!(result, Err(TagError::InvalidQuery(_))),
            "expected InvalidQuery for {text:?}"
        );
    }
}

#[test]
fn test_custom_attribute_handler() {
    let mut handlers = AttributeHandlers::with_defaults();
    let prefix: AttributeHandler = Arc::new(|value: &str, _node: &QueryNode, resource: &Resource| {
        resource.id.starts_with(value)
    });
    handlers.insert("prefix", prefix);
    let query = Query::parse("prefix:Wiki", handlers).unwrap();
    assert!(query
        .matches(&split_into_tags(""), &Resource::new("wiki", "WikiStart"))
        .unwrap());
    assert!(!query
        .matches(&split_into_tags(""), &Resource::new("wiki", "TracGuide"))
        .unwrap());
}

#[test]
fn test_evaluation_semantics() {
    assert!(matches("a b", "a b c"));
    assert!(!matches("a b", "a c"));
    assert!(matches("a or b", "b"));
    assert!(!matches("a or b", "c"));
    assert!(matches("not a", "b"));
    assert!(!matches("-a", "a"));
    assert!(matches("realm:wiki", ""));
    assert!(!matches("realm:ticket", "a"));
    assert!(matches("(a or b) -c", "b"));
    assert!(!matches("(a or b) -c", "b c"));
}

#[test]
fn test_empty_or_matches_nothing() {
    let handlers = AttributeHandlers::with_defaults();
    let resource = Resource::new("wiki", "P");
    let tags = split_into_tags("a");
    assert!(!evaluate(&QueryNode::Or(Vec::new()), &tags, &resource, &handlers).unwrap());
    assert!(evaluate(&QueryNode::And(Vec::new()), &tags, &resource, &handlers).unwrap());
}

#[test]
fn test_unhandled_attribute_fails_evaluation() {
    let node = QueryNode::Attribute {
        key: "color".to_owned(),
        value: "red".to_owned(),
    };
    let result = evaluate(
        &node,
        &split_into_tags("a"),
        &Resource::new("wiki", "P"),
        &AttributeHandlers::empty(),
    );
    assert!(matches!(result, Err(TagError::InvalidQuery(_))));
}

#[test]
fn test_terms_include_negated_literals() {
    let query = Query::with_default_handlers("a -b realm:wiki (c or \"d e\")").unwrap();
    let mut expected: TagSet = split_into_tags("a b c");
    expected.insert("d e".to_owned());
    assert_eq!(query.terms(), &expected);
}

#[test]
fn test_canonical_string_reparses_equivalently() {
    for text in [
        "a b",
        "a   or b",
        "(a or b) c",
        "-(a b)",
        "not a",
        "\"two words\" realm:wiki",
        "'\"quoted\"'",
        "\"-dash\" \"x:y\"",
        "a or (b c) or -d",
    ] {
        let first = Query::with_default_handlers(text).unwrap();
        let second = Query::with_default_handlers(first.as_string()).unwrap();
        assert_eq!(
            first.as_string(),
            second.as_string(),
            "canonical form of {text:?} is not stable"
        );
        for tags in ["", "a", "b", "a b", "c", "a c", "d", "two words", "-dash x:y"] {
            let resource = Resource::new("wiki", "P");
            let set = split_into_tags(tags);
            assert_eq!(
                first.matches(&set, &resource).unwrap(),
                second.matches(&set, &resource).unwrap(),
                "{text:?} and its canonical form disagree on {tags:?}"
            );
        }
    }
}

#[test]
fn test_canonical_forms() {
    let query = Query::with_default_handlers("a  (b or c)   -d").unwrap();
    assert_eq!(query.as_string(), "a (b or c) -d");
    assert_eq!(query.to_string(), "a (b or c) -d");
    let negated = Query::with_default_handlers("not (a b)").unwrap();
    assert_eq!(negated.as_string(), "-(a b)");
}

#[test]
fn test_prefetch_over_approximates() {
    let prefetch = |text: &str| Query::with_default_handlers(text).unwrap().prefetch_tags();
    assert_eq!(prefetch("a"), Some(split_into_tags("a")));
    assert_eq!(prefetch("a b"), Some(split_into_tags("a")));
    assert_eq!(prefetch("a or b"), Some(split_into_tags("a b")));
    assert_eq!(prefetch("(a or b) c"), Some(split_into_tags("c")));
    assert_eq!(prefetch("a or -b"), None);
    assert_eq!(prefetch("not a"), None);
    assert_eq!(prefetch("realm:wiki"), None);
    assert_eq!(prefetch("realm:wiki a"), Some(split_into_tags("a")));
    assert_eq!(prefetch(""), None);
}
