//! Application constants for the auction reshaper
//!
//! Column labels for every supported export locale, default status labels,
//! default paths and the file names of the exported aggregation tables.

use chrono::Month;

// =============================================================================
// Table Layout
// =============================================================================

/// Number of month columns in a wide row
pub const MONTH_COUNT: usize = 12;

/// Total columns in a wide row: status + 12 months + year
pub const WIDE_COLUMN_COUNT: usize = MONTH_COUNT + 2;

/// Position of the status column in the canonical layout
pub const STATUS_COLUMN: usize = 0;

/// Position of the year column in the canonical layout
pub const YEAR_COLUMN: usize = WIDE_COLUMN_COUNT - 1;

/// Calendar months in column order
pub const MONTHS: [Month; MONTH_COUNT] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

// =============================================================================
// Locale Labels
// =============================================================================

pub mod english {
    pub const STATUS_HEADER: &str = "status";
    pub const YEAR_HEADER: &str = "year";
    pub const MONTH_NAMES: [&str; super::MONTH_COUNT] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    pub const STATUS_WON: &str = "won";
    pub const STATUS_LOST: &str = "lost";
    pub const STATUS_REJECTED: &str = "rejected-stage-1";
}

/// Labels used by the original Russian-language auction exports
pub mod russian {
    pub const STATUS_HEADER: &str = "статус";
    pub const YEAR_HEADER: &str = "год";
    pub const MONTH_NAMES: [&str; super::MONTH_COUNT] = [
        "январь",
        "февраль",
        "март",
        "апрель",
        "май",
        "июнь",
        "июль",
        "август",
        "сентябрь",
        "октябрь",
        "ноябрь",
        "декабрь",
    ];

    pub const STATUS_WON: &str = "выиграно";
    pub const STATUS_LOST: &str = "проиграно";
    pub const STATUS_REJECTED: &str = "отклонено по первой части";
}

// =============================================================================
// Long-Form Column Names
// =============================================================================

pub mod columns {
    pub const YEAR: &str = "year";
    pub const MONTH_KEY: &str = "month_key";
    pub const STATUS: &str = "status";
    pub const COUNT: &str = "count";
}

// =============================================================================
// Paths and Report Files
// =============================================================================

/// Input used when no path is given on the command line
pub const DEFAULT_INPUT_PATH: &str = "data/auctions_data.csv";

/// Directory the aggregation tables are written to
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

pub mod report_files {
    pub const YEARLY_TOTALS: &str = "yearly_totals.csv";
    pub const MONTHLY_TOTALS: &str = "monthly_totals.csv";
    pub const YEAR_MONTH_MATRIX: &str = "year_month_matrix.csv";
    pub const WIN_RATIO: &str = "win_ratio.csv";
    pub const REJECTED_BY_YEAR: &str = "rejected_by_year.csv";
    pub const WIN_LOSS_TOTALS: &str = "win_loss_totals.csv";

    pub const ALL: &[&str] = &[
        YEARLY_TOTALS,
        MONTHLY_TOTALS,
        YEAR_MONTH_MATRIX,
        WIN_RATIO,
        REJECTED_BY_YEAR,
        WIN_LOSS_TOTALS,
    ];
}
