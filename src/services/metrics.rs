use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Playlist requests by service kind and outcome (`ok`, `bad_request`, `upstream_error`, ...)
    pub static ref PLAYLIST_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "playlist_requests_total",
        "Playlist requests by service and outcome",
        &["service", "outcome"]
    )
    .expect("playlist_requests_total registers once");

    /// Failed upstream fetches by target (`feed`, `pbs_kids`, `plex_catalog`)
    pub static ref UPSTREAM_FETCH_FAILURES: IntCounterVec = register_int_counter_vec!(
        "upstream_fetch_failures_total",
        "Failed upstream fetches by target",
        &["target"]
    )
    .expect("upstream_fetch_failures_total registers once");
}

/// Record the outcome of one playlist request
pub fn record_request(service: &str, outcome: &str) {
    PLAYLIST_REQUESTS.with_label_values(&[service, outcome]).inc();
}
