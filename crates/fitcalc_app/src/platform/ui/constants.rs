/// Width of the progress bar, in cells.
pub const PROGRESS_BAR_WIDTH: usize = 30;
pub const COLUMN_GAP: &str = "  ";

pub const HEADING_TOTALS: &str = "Totals";
pub const HEADING_FITTING: &str = "Parsed Fitting";
pub const HEADING_RECOMMENDATIONS: &str = "Purchase Recommendations";
