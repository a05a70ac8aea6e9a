use super::*;
use crate::tag::Resource;

#[test]
fn test_allow_all_is_default() {
    let policy = AllowAll;
    assert!(policy.authorized("anyone", &Resource::new("wiki", "X"), TagAction::Modify));
    assert!(policy.is_default());
}

#[test]
fn test_stock_grants_view_to_anonymous_only() {
    let policy = GrantTable::stock();
    let page = Resource::new("wiki", "WikiStart");
    assert!(policy.authorized(Requester::ANONYMOUS, &page, TagAction::View));
    assert!(!policy.authorized(Requester::ANONYMOUS, &page, TagAction::Modify));
    assert!(policy.authorized("alice", &page, TagAction::Modify));
    assert!(policy.authorized("alice", &page, TagAction::View));
    assert!(policy.is_default());
}

#[test]
fn test_realm_scoped_grant() {
    let policy = GrantTable::new().grant("bob", Some("ticket"), TagAction::View);
    assert!(policy.authorized("bob", &Resource::new("ticket", "1"), TagAction::View));
    assert!(!policy.authorized("bob", &Resource::new("wiki", "A"), TagAction::View));
    assert!(!policy.authorized("carol", &Resource::new("ticket", "1"), TagAction::View));
}

#[test]
fn test_denial_overrides_grant_and_disables_default() {
    let secret = Resource::new("wiki", "Secret");
    let policy = GrantTable::stock().deny("*", secret.clone(), TagAction::View);
    assert!(!policy.authorized("alice", &secret, TagAction::View));
    assert!(!policy.authorized("alice", &secret, TagAction::Modify));
    assert!(policy.authorized("alice", &Resource::new("wiki", "Public"), TagAction::View));
    assert!(!policy.is_default());
}

#[test]
fn test_action_display() {
    assert_eq!(TagAction::View.to_string(), "view");
    assert_eq!(TagAction::Modify.to_string(), "modify");
}

#[test]
fn test_requester_anonymous() {
    assert!(Requester::anonymous().is_anonymous());
    assert!(!Requester::new("alice").is_anonymous());
}
