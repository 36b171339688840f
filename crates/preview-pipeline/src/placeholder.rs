//! Asset placeholder resolution
//!
//! Generated code refers to assets through `%%<id>%%` tokens so large data
//! URIs never pass through the model. Tokens are swapped for the asset content
//! right before transformation; the stored source keeps the tokens.

use std::collections::HashMap;

use asset_library::AssetRecord;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%%([A-Za-z0-9_\-]+)%%").expect("placeholder pattern is valid")
});

/// Replace every `%%id%%` token that matches an asset with that asset's content.
///
/// Substitution happens in a single pass over the source, so content that
/// itself looks like a token is never expanded again. Tokens with no matching
/// asset are left untouched.
pub fn resolve_placeholders(source: &str, assets: &[AssetRecord]) -> String {
    if assets.is_empty() {
        return source.to_string();
    }
    // Table order decides duplicates: the first record with an id wins
    let mut by_id: HashMap<&str, &str> = HashMap::with_capacity(assets.len());
    for record in assets {
        by_id
            .entry(record.id.as_str())
            .or_insert(record.content.as_str());
    }

    PLACEHOLDER
        .replace_all(source, |caps: &Captures<'_>| match by_id.get(&caps[1]) {
            Some(content) => (*content).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Ids of placeholder tokens in `source` that no asset resolves, in order of first use
pub fn unresolved_placeholders(source: &str, assets: &[AssetRecord]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(source) {
        let id = &caps[1];
        let known = assets.iter().any(|record| record.id == id);
        if !known && !missing.iter().any(|m| m == id) {
            missing.push(id.to_string());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_library::AssetKind;

    fn record(id: &str, content: &str) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            kind: AssetKind::Image,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_resolves_every_occurrence() {
        let assets = vec![record("asset_1", "data:image/png;base64,AAA")];
        let source = r#"<img src="%%asset_1%%" /><img src="%%asset_1%%" />"#;
        let resolved = resolve_placeholders(source, &assets);
        assert_eq!(
            resolved,
            r#"<img src="data:image/png;base64,AAA" /><img src="data:image/png;base64,AAA" />"#
        );
    }

    #[test]
    fn test_unknown_tokens_are_left_alone() {
        let assets = vec![record("asset_1", "x")];
        let resolved = resolve_placeholders("%%asset_1%% %%asset_9%% 50%", &assets);
        assert_eq!(resolved, "x %%asset_9%% 50%");
    }

    #[test]
    fn test_content_is_not_rescanned() {
        let assets = vec![record("asset_1", "%%asset_2%%"), record("asset_2", "two")];
        assert_eq!(resolve_placeholders("%%asset_1%%", &assets), "%%asset_2%%");
    }

    #[test]
    fn test_prefix_ids_do_not_collide() {
        let assets = vec![record("asset_1", "one"), record("asset_10", "ten")];
        assert_eq!(resolve_placeholders("%%asset_10%%/%%asset_1%%", &assets), "ten/one");
    }

    #[test]
    fn test_duplicate_ids_first_record_wins() {
        let assets = vec![
            record("asset_1", "first"),
            record("asset_2", "two"),
            record("asset_1", "second"),
        ];
        assert_eq!(resolve_placeholders("%%asset_1%%-%%asset_2%%", &assets), "first-two");
    }

    #[test]
    fn test_empty_table_is_identity() {
        assert_eq!(resolve_placeholders("%%asset_1%%", &[]), "%%asset_1%%");
    }

    #[test]
    fn test_unresolved_placeholders() {
        let assets = vec![record("asset_1", "x")];
        let missing = unresolved_placeholders("%%asset_3%% %%asset_1%% %%asset_3%% %%asset_2%%", &assets);
        assert_eq!(missing, vec!["asset_3".to_string(), "asset_2".to_string()]);
    }
}
