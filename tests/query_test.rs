#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{alice, memory_system, query_ids, seed, tags};
use futures::StreamExt as _;
use std::sync::Arc;
use tagspace::{
    AttributeHandler, AttributeHandlers, GrantTable, QueryNode, Requester, Resource, TagAction,
    TagError, TagStore, TagsConfig,
};

const CORPUS: &[(&str, &str, &str)] = &[
    ("wiki", "A", "a b"),
    ("wiki", "B", "a"),
    ("wiki", "C", "b c"),
    ("wiki", "D", "d"),
    ("ticket", "1", "a b"),
    ("ticket", "2", "c"),
];

#[tokio::test]
async fn test_and_requires_every_tag() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    assert_eq!(
        query_ids(&system, &alice(), "a b").await,
        vec!["ticket:1", "wiki:A"]
    );
}

#[tokio::test]
async fn test_or_is_union() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    assert_eq!(
        query_ids(&system, &alice(), "a or c").await,
        vec!["ticket:1", "ticket:2", "wiki:A", "wiki:B", "wiki:C"]
    );
}

#[tokio::test]
async fn test_not_scans_every_tagged_resource_in_scope() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    assert_eq!(
        query_ids(&system, &alice(), "not a realm:wiki").await,
        vec!["wiki:C", "wiki:D"]
    );
    assert_eq!(
        query_ids(&system, &alice(), "-a").await,
        vec!["ticket:2", "wiki:C", "wiki:D"]
    );
}

#[tokio::test]
async fn test_or_with_negated_branch_is_not_underfetched() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    // No literal is shared by every branch, so nothing may be prefetched away.
    assert_eq!(
        query_ids(&system, &alice(), "d or -b").await,
        vec!["ticket:2", "wiki:B", "wiki:D"]
    );
}

#[tokio::test]
async fn test_nested_groups() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    assert_eq!(
        query_ids(&system, &alice(), "(a or c) -b").await,
        vec!["ticket:2", "wiki:B"]
    );
    assert_eq!(
        query_ids(&system, &alice(), "realm:ticket (a or d)").await,
        vec!["ticket:1"]
    );
}

#[tokio::test]
async fn test_empty_query_matches_every_tagged_resource() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    assert_eq!(query_ids(&system, &alice(), "").await.len(), CORPUS.len());
}

#[tokio::test]
async fn test_empty_query_without_permission_matches_nothing() {
    let store = Arc::new(TagStore::in_memory());
    let writer = common::build_system(&store, Arc::new(tagspace::AllowAll), &TagsConfig::default());
    seed(&writer, CORPUS).await;
    let locked = common::build_system(&store, Arc::new(GrantTable::new()), &TagsConfig::default());
    assert!(query_ids(&locked, &Requester::anonymous(), "").await.is_empty());
}

#[tokio::test]
async fn test_quoted_multi_word_tag() {
    let (_store, system) = memory_system();
    let page = Resource::new("wiki", "Multi");
    let multi: tagspace::TagSet = ["two words".to_owned()].into_iter().collect();
    system.set_tags(&alice(), &page, &multi, "").await.unwrap();
    assert_eq!(
        query_ids(&system, &alice(), "\"two words\"").await,
        vec!["wiki:Multi"]
    );
    assert!(query_ids(&system, &alice(), "two words").await.is_empty());
}

#[tokio::test]
async fn test_invalid_queries_fail_before_streaming() {
    let (_store, system) = memory_system();
    for text in ["\"unbalanced", "a or", "color:red", "realm:blog"] {
        let result = system.query(&alice(), text, None);
        assert!(
            matches!(
                result,
                Err(TagError::InvalidQuery(_) | TagError::InvalidTagRealm(_))
            ),
            "{text:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_extra_attribute_handler() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    let mut extra = AttributeHandlers::empty();
    let id_handler: AttributeHandler = Arc::new(|value: &str, _node: &QueryNode, resource: &Resource| {
        resource.id == value
    });
    extra.insert("id", id_handler);
    let hits = system
        .query_all(&alice(), "a id:B", Some(&extra))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].resource, Resource::new("wiki", "B"));
    assert_eq!(hits[0].tags, tags("a"));
}

#[tokio::test]
async fn test_query_hides_resources_the_requester_cannot_view() {
    let store = Arc::new(TagStore::in_memory());
    let writer = common::build_system(&store, Arc::new(tagspace::AllowAll), &TagsConfig::default());
    seed(&writer, CORPUS).await;

    let policy = GrantTable::stock().deny("*", Resource::new("wiki", "A"), TagAction::View);
    let reader = common::build_system(&store, Arc::new(policy), &TagsConfig::default());
    assert_eq!(
        query_ids(&reader, &Requester::anonymous(), "a").await,
        vec!["ticket:1", "wiki:B"]
    );
}

#[tokio::test]
async fn test_query_stream_is_lazy_per_realm() {
    let (_store, system) = memory_system();
    seed(&system, CORPUS).await;
    let mut stream = system.query(&alice(), "a", None).unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert!(first.tags.contains("a"));
    let rest: Vec<_> = stream.collect().await;
    assert_eq!(rest.len(), 2);
}

#[tokio::test]
async fn test_wiki_pages_scenario() {
    let (_store, system) = memory_system();
    seed(
        &system,
        &[
            ("wiki", "PageA", "docs howto"),
            ("wiki", "PageB", "docs"),
            ("ticket", "7", "docs"),
        ],
    )
    .await;

    assert_eq!(
        query_ids(&system, &alice(), "realm:wiki docs").await,
        vec!["wiki:PageA", "wiki:PageB"]
    );
    assert_eq!(
        query_ids(&system, &alice(), "docs howto").await,
        vec!["wiki:PageA"]
    );
    assert_eq!(
        query_ids(&system, &alice(), "docs").await,
        vec!["ticket:7", "wiki:PageA", "wiki:PageB"]
    );
}
