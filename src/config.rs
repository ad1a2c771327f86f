use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub app_env: String,
    /// Only serve playlists on `/` and answer 404 elsewhere
    pub strict_root_path: bool,

    // Upstreams
    pub upstream_base_url: String,
    pub epg_base_url: String,
    pub plex_catalog_url: String,
    pub fetch_timeout_ms: u64,

    // Compatibility
    /// Report PBS Kids fetch failures inside a 200 body instead of a 500
    pub pbs_kids_legacy_errors: bool,

    // Misc
    pub user_agent: String,
}

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://i.mjh.nz";
const DEFAULT_EPG_BASE_URL: &str = "https://github.com/matthuisman/i.mjh.nz/raw/master";
const DEFAULT_PLEX_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/dtankdempse/free-iptv-channels/main/plex/channels.json";

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            strict_root_path: env_flag("STRICT_ROOT_PATH", false),

            // Upstreams
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            epg_base_url: env::var("EPG_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EPG_BASE_URL.to_string()),
            plex_catalog_url: env::var("PLEX_CATALOG_URL")
                .unwrap_or_else(|_| DEFAULT_PLEX_CATALOG_URL.to_string()),
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            // Compatibility
            pbs_kids_legacy_errors: env_flag("PBS_KIDS_LEGACY_ERRORS", true),

            // Misc
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| {
                format!("mjh-playlist-gateway/{}", env!("CARGO_PKG_VERSION"))
            }),
        }
    }

    /// Configuration pointing every upstream at `base_url`, used by tests
    #[cfg(test)]
    pub fn for_upstream(base_url: &str) -> Self {
        Self {
            port: 0,
            app_env: "test".to_string(),
            strict_root_path: false,
            upstream_base_url: base_url.to_string(),
            epg_base_url: DEFAULT_EPG_BASE_URL.to_string(),
            plex_catalog_url: format!("{}/plex/channels.json", base_url),
            fetch_timeout_ms: 5_000,
            pbs_kids_legacy_errors: true,
            user_agent: "mjh-playlist-gateway/test".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
