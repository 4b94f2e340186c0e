/// Identifying header sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; nuLiga-team-portrait-scraper/1.0)";
pub const FETCH_TIMEOUT_SECS: u64 = 30;

// Marker phrases used to anchor the heuristics on nuLiga pages
pub const SCHEDULE_MARKER: &str = "Spieltermine";
pub const HALL_ADDRESS_MARKER: &str = "Hallenadresse";

pub const SCHEDULE_NOT_FOUND: &str = "Konnte die Spieltermine-Tabellen nicht finden.";

// Export defaults
pub const DEFAULT_OUTPUT: &str = "team_events.csv";
pub const DEFAULT_DURATION_MINUTES: u32 = 120;
/// Start time assumed when the time cell is empty
pub const DEFAULT_START_TIME: &str = "19:30";

/// Rows with fewer cells are headers or spacers
pub const MIN_ROW_CELLS: usize = 7;
pub const MAX_ADDRESS_LINES: usize = 3;

pub const FRAGMENT_SEPARATOR: &str = " | ";

pub const CSV_COLUMNS: [&str; 9] = [
    "Subject",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "All Day Event",
    "Description",
    "Location",
    "Private",
];
