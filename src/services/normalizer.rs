//! Channel normalization
//!
//! Flattens a feed document into lineup entries for one request: picks the
//! requested region (or merges all of them), applies the Plex region and genre
//! rules and resolves each channel's group-title.

use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::region::display_name;
use crate::models::{
    Channel, FeedDocument, LineupEntry, PlaylistRequest, PlexCatalogEntry, RegionFeed, ServiceKind,
};

/// Group used for Plex channels missing from the catalog
const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Invalid region {0}")]
    InvalidRegion(String),
    #[error("Invalid data format")]
    InvalidDataFormat,
}

/// Plex feeds filtered to one region take their groups from the Plex catalog
pub fn needs_plex_catalog(doc: &FeedDocument, req: &PlaylistRequest) -> bool {
    req.kind == ServiceKind::Plex && !req.is_all_regions() && doc.channels.is_some()
}

/// Build the lineup for `req`, in feed order.
///
/// `catalog` is only consulted when [`needs_plex_catalog`] holds.
pub fn normalize(
    doc: FeedDocument,
    req: &PlaylistRequest,
    catalog: &[PlexCatalogEntry],
) -> Result<Vec<LineupEntry>, NormalizeError> {
    let is_plex = req.kind == ServiceKind::Plex;

    if let Some(channels) = doc.channels {
        if is_plex && !req.is_all_regions() {
            return Ok(plex_region_lineup(channels, &req.region, catalog));
        }
        let channels = if is_plex {
            // Plex "all" only lists channels that belong to at least one region
            channels
                .into_iter()
                .filter(|(_, c)| !c.regions.is_empty())
                .collect::<IndexMap<_, _>>()
        } else {
            channels
        };
        return Ok(lineup(channels, req));
    }

    let Some(regions) = doc.regions else {
        return Err(NormalizeError::InvalidDataFormat);
    };

    let channels = if req.is_all_regions() {
        merge_regions(regions)
    } else {
        regions
            .into_iter()
            .find(|(code, _)| *code == req.region)
            .map(|(_, feed)| feed.channels)
            .ok_or_else(|| NormalizeError::InvalidRegion(req.region.clone()))?
    };

    Ok(lineup(channels, req))
}

/// Union of every region's channels; the first region listing a key wins
fn merge_regions(regions: IndexMap<String, RegionFeed>) -> IndexMap<String, Channel> {
    let mut merged = IndexMap::new();

    for (code, feed) in regions {
        let label = feed.label(&code);
        for (key, channel) in feed.channels {
            merged.entry(key).or_insert_with(|| Channel {
                region: Some(label.clone()),
                ..channel
            });
        }
    }

    merged
}

/// Channels available in `region`, grouped by their Plex catalog genre
fn plex_region_lineup(
    channels: IndexMap<String, Channel>,
    region: &str,
    catalog: &[PlexCatalogEntry],
) -> Vec<LineupEntry> {
    let mut genres: HashMap<&str, &str> = HashMap::new();
    for entry in catalog {
        if let Some(title) = entry.title.as_deref() {
            genres
                .entry(title)
                .or_insert_with(|| entry.genre.as_deref().unwrap_or_default());
        }
    }

    channels
        .into_iter()
        .filter(|(_, c)| c.regions.iter().any(|r| r == region))
        .map(|(key, channel)| {
            let group = genres
                .get(channel.name.as_str())
                .filter(|g| !g.is_empty())
                .map_or(UNCATEGORIZED, |g| *g)
                .to_string();
            LineupEntry { key, channel, group }
        })
        .collect()
}

fn lineup(channels: IndexMap<String, Channel>, req: &PlaylistRequest) -> Vec<LineupEntry> {
    let fan_out = req.kind == ServiceKind::Plex && req.is_all_regions();
    let mut entries = Vec::with_capacity(channels.len());

    for (key, channel) in channels {
        if fan_out && !channel.regions.is_empty() {
            // One row per region the channel is listed in
            for code in &channel.regions {
                entries.push(LineupEntry {
                    key: key.clone(),
                    channel: channel.clone(),
                    group: display_name(code),
                });
            }
            continue;
        }

        let group = resolve_group(&channel, req);
        entries.push(LineupEntry { key, channel, group });
    }

    entries
}

/// Service specific group-title of a channel
fn resolve_group(channel: &Channel, req: &PlaylistRequest) -> String {
    let group = channel.group.clone().unwrap_or_default();

    if req.kind == ServiceKind::Roku {
        return String::new();
    }
    if !req.is_all_regions() {
        return group;
    }

    match (req.kind, channel.region_label()) {
        (ServiceKind::SamsungTvPlus | ServiceKind::PlutoTv, Some(label)) => label.to_string(),
        (_, Some(label)) => format!("{} ({})", group, label.to_uppercase()),
        (_, None) => group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaylistQuery;
    use serde_json::json;

    fn request(service: &str, region: &str) -> PlaylistRequest {
        PlaylistRequest::from_query(PlaylistQuery {
            service: Some(service.to_string()),
            region: Some(region.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn doc(value: serde_json::Value) -> FeedDocument {
        serde_json::from_value(value).unwrap()
    }

    fn keys(entries: &[LineupEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_flat_feed_uses_channel_groups() {
        let feed = doc(json!({ "channels": {
            "a": { "name": "A", "group": "News" },
            "b": { "name": "B" }
        }}));

        let entries = normalize(feed, &request("plutotv", "us"), &[]).unwrap();
        assert_eq!(keys(&entries), vec!["a", "b"]);
        assert_eq!(entries[0].group, "News");
        assert_eq!(entries[1].group, "");
    }

    #[test]
    fn test_roku_group_always_empty() {
        let feed = doc(json!({ "channels": { "a": { "name": "A", "group": "News" } } }));

        let entries = normalize(feed, &request("Roku", "us"), &[]).unwrap();
        assert_eq!(entries[0].group, "");
    }

    #[test]
    fn test_regioned_all_first_writer_wins() {
        let feed = doc(json!({ "regions": {
            "us": { "channels": { "a": { "name": "A-us" } } },
            "nz": { "channels": { "a": { "name": "A-nz" }, "b": { "name": "B" } } }
        }}));

        let entries = normalize(feed, &request("samsungtvplus", "all"), &[]).unwrap();
        assert_eq!(keys(&entries), vec!["a", "b"]);
        assert_eq!(entries[0].channel.name, "A-us");
        assert_eq!(entries[0].channel.region.as_deref(), Some("US"));
        assert_eq!(entries[1].channel.region.as_deref(), Some("NZ"));
    }

    #[test]
    fn test_regioned_all_group_for_samsung_and_pluto_is_region_label() {
        let feed = doc(json!({ "regions": {
            "us": { "name": "United States", "channels": { "a": { "name": "A", "group": "News" } } }
        }}));

        let entries = normalize(feed.clone(), &request("samsungtvplus", "all"), &[]).unwrap();
        assert_eq!(entries[0].group, "United States");

        let entries = normalize(feed, &request("PlutoTV", "all"), &[]).unwrap();
        assert_eq!(entries[0].group, "United States");
    }

    #[test]
    fn test_regioned_all_group_suffix_for_other_services() {
        let feed = doc(json!({ "regions": {
            "ca": { "name": "Canada", "channels": {
                "a": { "name": "A", "group": "News" },
                "b": { "name": "B" }
            }}
        }}));

        let entries = normalize(feed, &request("stirr", "all"), &[]).unwrap();
        assert_eq!(entries[0].group, "News (CANADA)");
        assert_eq!(entries[1].group, " (CANADA)");
    }

    #[test]
    fn test_regioned_concrete_region() {
        let feed = doc(json!({ "regions": {
            "us": { "channels": { "a": { "name": "A", "group": "Movies" } } },
            "ca": { "channels": { "b": { "name": "B" } } }
        }}));

        let entries = normalize(feed, &request("plutotv", "CA"), &[]).unwrap();
        assert_eq!(keys(&entries), vec!["b"]);
        assert!(entries[0].channel.region.is_none());
    }

    #[test]
    fn test_regioned_unknown_region() {
        let feed = doc(json!({ "regions": { "us": { "channels": {} } } }));

        let err = normalize(feed, &request("plutotv", "zz"), &[]).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidRegion("zz".to_string()));
    }

    #[test]
    fn test_malformed_document() {
        let err = normalize(doc(json!({ "foo": 1 })), &request("roku", "us"), &[]).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidDataFormat);
    }

    #[test]
    fn test_plex_region_filter_and_genres() {
        let feed = doc(json!({ "channels": {
            "m": { "name": "Movies 24", "regions": ["us", "ca"] },
            "n": { "name": "News Now", "regions": ["us"] },
            "x": { "name": "Only Canada", "regions": ["ca"] },
            "e": { "name": "Empty Genre", "regions": ["us"] }
        }}));
        let catalog = vec![
            PlexCatalogEntry { title: Some("Movies 24".into()), genre: Some("Movies".into()) },
            PlexCatalogEntry { title: Some("Movies 24".into()), genre: Some("Later".into()) },
            PlexCatalogEntry { title: Some("Empty Genre".into()), genre: Some(String::new()) },
        ];
        let req = request("plex", "us");

        assert!(needs_plex_catalog(&feed, &req));
        let entries = normalize(feed, &req, &catalog).unwrap();

        assert_eq!(keys(&entries), vec!["m", "n", "e"]);
        assert_eq!(entries[0].group, "Movies");
        assert_eq!(entries[1].group, "Uncategorized");
        assert_eq!(entries[2].group, "Uncategorized");
    }

    #[test]
    fn test_plex_all_fans_out_per_region() {
        let feed = doc(json!({ "channels": {
            "m": { "name": "Movies 24", "regions": ["us", "gb"] },
            "z": { "name": "No Regions" }
        }}));
        let req = request("plex", "all");

        assert!(!needs_plex_catalog(&feed, &req));
        let entries = normalize(feed, &req, &[]).unwrap();

        assert_eq!(keys(&entries), vec!["m", "m"]);
        assert_eq!(entries[0].group, "USA");
        assert_eq!(entries[1].group, "GB");
    }

    #[test]
    fn test_plex_catalog_not_needed_for_regioned_feeds() {
        let feed = doc(json!({ "regions": { "us": { "channels": {} } } }));
        assert!(!needs_plex_catalog(&feed, &request("plex", "us")));
    }
}
