use crate::query::REALM_ATTRIBUTE;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Unquoted `realm:<name>` tokens, compiled once on first use.
#[expect(
    clippy::expect_used,
    reason = "Pattern is built from a constant and cannot fail"
)]
static REALM_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:^|[\s(-]){REALM_ATTRIBUTE}:(\w+)"))
        .expect("REALM_TOKEN_REGEX is a valid pattern")
});

/// Realms named by unquoted `realm:<name>` tokens in a canonical query
/// string. Empty when the query names none, i.e. every realm is in scope.
#[must_use]
pub fn scan_realms(canonical: &str) -> BTreeSet<String> {
    REALM_TOKEN_REGEX
        .captures_iter(canonical)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_owned())
        .collect()
}
