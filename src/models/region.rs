/// Region code meaning "every region in the feed"
pub const ALL_REGIONS: &str = "all";

/// Region requested when the query does not name one
pub const DEFAULT_REGION: &str = "us";

/// Display name for a region code, falling back to the uppercased code
pub fn display_name(code: &str) -> String {
    match code {
        "us" => "USA",
        "mx" => "Mexico",
        "es" => "Spain",
        "ca" => "Canada",
        "au" => "Australia",
        "nz" => "New Zealand",
        other => return other.to_uppercase(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_region_names() {
        assert_eq!(display_name("us"), "USA");
        assert_eq!(display_name("nz"), "New Zealand");
    }

    #[test]
    fn test_unknown_region_uppercased() {
        assert_eq!(display_name("gb"), "GB");
        assert_eq!(display_name("de"), "DE");
    }
}
