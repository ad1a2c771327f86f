//! M3U8 rendering
//!
//! Pure functions: no fetching, no server state.

use crate::models::{Channel, FeedDocument, LineupEntry, PlaylistRequest, ServiceKind};
use crate::services::normalizer::NormalizeError;

/// Appended to the PBS license key to form the Widevine key request
const PBS_LICENSE_KEY_TEMPLATE: &str =
    "|Content-Type=application%2Foctet-stream&user-agent=okhttp%2F4.9.0|R{SSM}|";

/// Appended to PBS stream URLs
const PBS_STREAM_SUFFIX: &str = "|user-agent=okhttp%2F4.9.0";

fn epg_url(epg_base: &str, service: &str, file: &str) -> String {
    format!("{}/{}/{}", epg_base.trim_end_matches('/'), service, file)
}

/// Render the general playlist: sorted by name, filtered, optionally renumbered
pub fn render_playlist(
    mut entries: Vec<LineupEntry>,
    req: &PlaylistRequest,
    epg_base: &str,
) -> String {
    let guide = if req.kind == ServiceKind::Roku {
        epg_url(epg_base, "roku", "all.xml.gz")
    } else {
        epg_url(epg_base, &req.service, &format!("{}.xml.gz", req.region))
    };

    let mut playlist = format!("#EXTM3U url-tvg=\"{}\"\n", guide);

    // Stable, so fanned-out rows keep their region order
    entries.sort_by(|a, b| a.channel.name.cmp(&b.channel.name));

    let mut next_chno = req.start_chno;

    for entry in &entries {
        let channel_id = req.channel_id(&entry.key);
        if !entry.channel.is_playable() || !req.admits(&channel_id) {
            continue;
        }

        let chno = match next_chno.as_mut() {
            Some(n) => {
                let current = *n;
                *n = n.saturating_add(1);
                Some(current)
            }
            None => entry.channel.chno,
        };

        let chno_attr = chno
            .map(|n| format!(" tvg-chno=\"{}\"", n))
            .unwrap_or_default();

        playlist.push_str(&format!(
            "#EXTINF:-1 channel-id=\"{id}\" tvg-id=\"{key}\" tvg-logo=\"{logo}\" group-title=\"{group}\"{chno},{name}\n{url}\n",
            id = channel_id,
            key = entry.key,
            logo = entry.channel.logo,
            group = entry.group,
            chno = chno_attr,
            name = entry.channel.name,
            url = entry.channel.url,
        ));
    }

    playlist
}

/// `#EXTINF` line used by the PBS and PBS Kids playlists
fn simple_extinf(prefix: &str, key: &str, channel: &Channel) -> String {
    format!(
        "#EXTINF:-1 channel-id=\"{}-{}\" tvg-id=\"{}\" tvg-logo=\"{}\", {}\n",
        prefix, key, key, channel.logo, channel.name
    )
}

/// Render the PBS playlist with Widevine properties, in feed order
pub fn render_pbs(doc: &FeedDocument, epg_base: &str) -> Result<String, NormalizeError> {
    let channels = doc
        .channels
        .as_ref()
        .ok_or(NormalizeError::InvalidDataFormat)?;

    let mut playlist = format!(
        "#EXTM3U x-tvg-url=\"{}\"\n",
        epg_url(epg_base, "PBS", "all.xml.gz")
    );

    for (key, channel) in channels {
        playlist.push_str(&simple_extinf("pbs", key, channel));
        playlist.push_str("#KODIPROP:inputstream.adaptive.manifest_type=mpd\n");
        playlist.push_str("#KODIPROP:inputstream.adaptive.license_type=com.widevine.alpha\n");
        playlist.push_str(&format!(
            "#KODIPROP:inputstream.adaptive.license_key={}{}\n",
            channel.license.as_deref().unwrap_or_default(),
            PBS_LICENSE_KEY_TEMPLATE
        ));
        playlist.push_str(&format!("{}{}\n", channel.url, PBS_STREAM_SUFFIX));
    }

    Ok(playlist)
}

/// Render the PBS Kids playlist, sorted by name ignoring case
pub fn render_pbs_kids(doc: &FeedDocument, epg_base: &str) -> Result<String, NormalizeError> {
    let channels = doc
        .channels
        .as_ref()
        .ok_or(NormalizeError::InvalidDataFormat)?;

    let mut sorted: Vec<(&String, &Channel)> = channels.iter().collect();
    sorted.sort_by_cached_key(|(_, channel)| channel.name.to_lowercase());

    let mut playlist = format!(
        "#EXTM3U url-tvg=\"{}\"\n",
        epg_url(epg_base, "PBS", "kids_all.xml.gz")
    );

    for (key, channel) in sorted {
        playlist.push_str(&simple_extinf("pbskids", key, channel));
        playlist.push_str(&channel.url);
        playlist.push('\n');
    }

    Ok(playlist)
}
