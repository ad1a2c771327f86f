use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Channel numbers show up as integers, floats or strings depending on the feed.
/// Anything that is not a positive whole number is treated as absent.
fn deserialize_chno<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawChno {
        Int(u64),
        Float(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let number = match Option::<RawChno>::deserialize(deserializer)? {
        Some(RawChno::Int(n)) => u32::try_from(n).ok(),
        Some(RawChno::Float(f)) if f.fract() == 0.0 && f > 0.0 && f <= u32::MAX as f64 => {
            Some(f as u32)
        }
        Some(RawChno::Text(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    Ok(number.filter(|n| *n > 0))
}

/// Single channel as published in an `.app.json` feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logo: String,
    #[serde(default, deserialize_with = "deserialize_chno")]
    pub chno: Option<u32>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    /// Origin region label, set when regions are merged
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// Part of the feed schema; grouping only looks at `group`
    #[allow(dead_code)]
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
}

impl Channel {
    /// Channels carrying a license server URL are DRM placeholders
    pub fn is_playable(&self) -> bool {
        self.license_url.as_deref().map_or(true, str::is_empty)
    }

    /// Non-empty region label attached during a region merge
    pub fn region_label(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

/// Channels of one region in a regioned feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionFeed {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: IndexMap<String, Channel>,
}

impl RegionFeed {
    /// Label attached to merged channels: the region name, or the uppercased code
    pub fn label(&self, code: &str) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => code.to_uppercase(),
        }
    }
}

/// Top-level `.app.json` document.
///
/// Either `channels` (flat form) or `regions` (regioned form) is expected.
/// Key order of both maps follows the JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub channels: Option<IndexMap<String, Channel>>,
    #[serde(default)]
    pub regions: Option<IndexMap<String, RegionFeed>>,
}

/// Entry of the third-party Plex channel catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexCatalogEntry {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
}

/// A channel ready to render, with its resolved group-title
#[derive(Debug, Clone)]
pub struct LineupEntry {
    pub key: String,
    pub channel: Channel,
    pub group: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_defaults_for_missing_and_null_fields() {
        let channel: Channel =
            serde_json::from_value(json!({ "name": "News", "logo": null })).unwrap();

        assert_eq!(channel.name, "News");
        assert_eq!(channel.logo, "");
        assert_eq!(channel.url, "");
        assert!(channel.regions.is_empty());
        assert!(channel.groups.is_empty());
        assert!(channel.chno.is_none());
        assert!(channel.is_playable());
    }

    #[test]
    fn test_chno_variants() {
        let parse = |v: serde_json::Value| -> Option<u32> {
            serde_json::from_value::<Channel>(json!({ "chno": v })).unwrap().chno
        };

        assert_eq!(parse(json!(42)), Some(42));
        assert_eq!(parse(json!(7.0)), Some(7));
        assert_eq!(parse(json!(" 12 ")), Some(12));
        assert_eq!(parse(json!(0)), None);
        assert_eq!(parse(json!("abc")), None);
        assert_eq!(parse(json!(null)), None);
        assert_eq!(parse(json!([1])), None);
    }

    #[test]
    fn test_groups_list_accepted_alongside_group() {
        let channel: Channel = serde_json::from_value(json!({
            "name": "News",
            "group": "News",
            "groups": ["News", "Local"]
        }))
        .unwrap();

        assert_eq!(channel.group.as_deref(), Some("News"));
        assert_eq!(channel.groups, vec!["News", "Local"]);
    }

    #[test]
    fn test_license_url_marks_channel_unplayable() {
        let drm: Channel =
            serde_json::from_value(json!({ "license_url": "https://lic.example" })).unwrap();
        let blank: Channel = serde_json::from_value(json!({ "license_url": "" })).unwrap();

        assert!(!drm.is_playable());
        assert!(blank.is_playable());
    }

    #[test]
    fn test_feed_document_preserves_key_order() {
        let body = r#"{"channels": {"zeta": {"name": "Z"}, "alpha": {"name": "A"}, "mid": {"name": "M"}}}"#;
        let doc: FeedDocument = serde_json::from_str(body).unwrap();

        let keys: Vec<_> = doc.channels.unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!(doc.regions.is_none());
    }

    #[test]
    fn test_region_feed_label() {
        let named = RegionFeed {
            name: Some("United States".to_string()),
            ..Default::default()
        };
        let unnamed = RegionFeed::default();

        assert_eq!(named.label("us"), "United States");
        assert_eq!(unnamed.label("gb"), "GB");
    }
}
