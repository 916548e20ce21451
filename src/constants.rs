/// Page and table name constants to ensure consistency across the codebase
/// These constants define the mapping between public page names and their
/// backing report tables

// Public page names (used in the query string)
pub const HOME_PAGE: &str = "home";
pub const TERM_PAGE: &str = "term";
pub const SAVING_PAGE: &str = "saving";

// Backing table names
pub const HOME_TABLE: &str = "home-page-insights-data";
pub const TERM_TABLE: &str = "term-page-insights-data";
pub const SAVING_TABLE: &str = "savings-page-insights-data";

// The UTC afternoon window treated as the canonical daily snapshot time
pub const AFTERNOON_START_HOUR: u32 = 14;
pub const AFTERNOON_END_HOUR: u32 = 16;

/// Get all supported page names
pub fn supported_pages() -> Vec<&'static str> {
    vec![HOME_PAGE, TERM_PAGE, SAVING_PAGE]
}
