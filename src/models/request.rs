use serde::Deserialize;
use std::collections::HashSet;

use super::region::{ALL_REGIONS, DEFAULT_REGION};
use crate::error::AppError;

/// Raw query string of a playlist request
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistQuery {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub start_chno: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub exclude: Option<String>,
}

impl PlaylistQuery {
    /// Trimmed service name, if present and non-blank
    pub fn service_name(&self) -> Option<&str> {
        self.service
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Services with their own rendering or grouping rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Pbs,
    PbsKids,
    Plex,
    Roku,
    SamsungTvPlus,
    PlutoTv,
    Other,
}

impl ServiceKind {
    /// Classify a service name, ignoring case
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pbs" => Self::Pbs,
            "pbskids" => Self::PbsKids,
            "plex" => Self::Plex,
            "roku" => Self::Roku,
            "samsungtvplus" => Self::SamsungTvPlus,
            "plutotv" => Self::PlutoTv,
            _ => Self::Other,
        }
    }

    /// Stable label for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pbs => "pbs",
            Self::PbsKids => "pbskids",
            Self::Plex => "plex",
            Self::Roku => "roku",
            Self::SamsungTvPlus => "samsungtvplus",
            Self::PlutoTv => "plutotv",
            Self::Other => "other",
        }
    }
}

/// Validated playlist request
#[derive(Debug, Clone)]
pub struct PlaylistRequest {
    /// Service name as given by the client, used verbatim in URLs and ids
    pub service: String,
    pub kind: ServiceKind,
    /// Lowercased region code
    pub region: String,
    pub start_chno: Option<u32>,
    pub include: HashSet<String>,
    pub exclude: HashSet<String>,
}

/// Split a comma separated id list, dropping empty items
fn parse_id_list(raw: Option<&str>) -> HashSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

impl PlaylistRequest {
    pub fn from_query(query: PlaylistQuery) -> Result<Self, AppError> {
        let service = query
            .service_name()
            .ok_or(AppError::MissingService)?
            .to_string();

        let region = query
            .region
            .as_deref()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let start_chno = match query.start_chno.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| AppError::InvalidStartChno(raw.to_string()))?,
            ),
        };

        Ok(Self {
            kind: ServiceKind::from_name(&service),
            service,
            region,
            start_chno,
            include: parse_id_list(query.include.as_deref()),
            exclude: parse_id_list(query.exclude.as_deref()),
        })
    }

    pub fn is_all_regions(&self) -> bool {
        self.region == ALL_REGIONS
    }

    /// Playlist-wide channel id: `<service>-<key>`
    pub fn channel_id(&self, key: &str) -> String {
        format!("{}-{}", self.service, key)
    }

    /// Apply the include/exclude lists to a channel id
    pub fn admits(&self, channel_id: &str) -> bool {
        (self.include.is_empty() || self.include.contains(channel_id))
            && !self.exclude.contains(channel_id)
    }
}
