pub mod channel;
pub mod region;
pub mod request;

pub use channel::{Channel, FeedDocument, LineupEntry, PlexCatalogEntry, RegionFeed};
pub use request::{PlaylistQuery, PlaylistRequest, ServiceKind};
