use serde_json::Value;

use crate::policy::EntityKind;

/// Parses the JSON-encoded image list stored on a record. Anything that is
/// not a JSON array of non-empty strings yields an empty list rather than an
/// error; records written by hand or by older versions stay readable.
pub fn parse_image_urls(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) if !url.is_empty() => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn stringify_image_urls(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_default()
}

/// First stored image, or the kind's placeholder when the list is empty.
pub fn primary_image_url(raw: &str, kind: EntityKind) -> String {
    parse_image_urls(raw)
        .into_iter()
        .next()
        .unwrap_or_else(|| kind.placeholder_url().to_string())
}

/// A record's cover URL, or the kind's placeholder when unset or blank.
pub fn cover_or_placeholder(url: Option<&str>, kind: EntityKind) -> String {
    match url {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => kind.placeholder_url().to_string(),
    }
}

/// Seeds the existing-image list for an edit draft: everything on the record
/// except URLs that belong to the other entity kind (its placeholder or
/// anything under its storage paths).
pub fn existing_images_for_edit(raw: &str, kind: EntityKind) -> Vec<String> {
    let other = kind.other();
    let markers = other.path_markers();
    parse_image_urls(raw)
        .into_iter()
        .filter(|url| {
            url != other.placeholder_url() && !markers.iter().any(|marker| url.contains(marker))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_non_arrays_and_non_strings() {
        assert!(parse_image_urls("").is_empty());
        assert!(parse_image_urls("   ").is_empty());
        assert!(parse_image_urls("not json").is_empty());
        assert!(parse_image_urls("{\"a\":1}").is_empty());
        assert_eq!(
            parse_image_urls("[\"https://x/a.jpg\", 42, \"\", \"https://x/b.jpg\"]"),
            vec!["https://x/a.jpg".to_string(), "https://x/b.jpg".to_string()]
        );
    }

    #[test]
    fn stringify_round_trips_order() {
        let urls = vec!["https://x/1.png".to_string(), "https://x/2.png".to_string()];
        assert_eq!(parse_image_urls(&stringify_image_urls(&urls)), urls);
    }

    #[test]
    fn primary_falls_back_to_placeholder() {
        assert_eq!(
            primary_image_url("[]", EntityKind::Unit),
            EntityKind::Unit.placeholder_url()
        );
        assert_eq!(
            primary_image_url("[\"https://x/a.jpg\"]", EntityKind::Unit),
            "https://x/a.jpg"
        );
    }

    #[test]
    fn cover_trims_and_defaults() {
        assert_eq!(
            cover_or_placeholder(Some("  https://x/c.jpg "), EntityKind::Property),
            "https://x/c.jpg"
        );
        assert_eq!(
            cover_or_placeholder(Some("   "), EntityKind::Property),
            EntityKind::Property.placeholder_url()
        );
        assert_eq!(
            cover_or_placeholder(None, EntityKind::Property),
            EntityKind::Property.placeholder_url()
        );
    }

    #[test]
    fn edit_seed_excludes_other_kind_images() {
        let raw = "[\"https://x/properties/a.jpg\",\"https://x/units/b.jpg\"]";
        assert_eq!(
            existing_images_for_edit(raw, EntityKind::Property),
            vec!["https://x/properties/a.jpg".to_string()]
        );
    }

    #[test]
    fn edit_seed_excludes_other_kind_placeholder_and_bucket() {
        let raw = stringify_image_urls(&[
            "https://cdn/property-images/properties/p1.jpg".to_string(),
            EntityKind::Property.placeholder_url().to_string(),
            "https://cdn/unit-images/units/u1.jpg".to_string(),
        ]);
        assert_eq!(
            existing_images_for_edit(&raw, EntityKind::Unit),
            vec!["https://cdn/unit-images/units/u1.jpg".to_string()]
        );
    }
}
