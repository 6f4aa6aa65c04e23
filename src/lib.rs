// Tribunal Admin - Core Library
// Formatters shared by the court calculators, plus the dataset and user
// collaborators used by the CLI and the dashboard.

pub mod config;
pub mod datasets;
pub mod error;
pub mod formatters;
pub mod users;

// Re-export commonly used types
pub use config::AppConfig;
pub use datasets::{latest_summary, summary_line, Dataset, DatasetKind, LatestEntry};
pub use error::{FormatError, FormatResult};
pub use formatters::{
    amount_to_words, days_in_month, format_currency, format_currency_decimal, format_date_ar,
    format_month_year, format_percentage, format_percentage_with, integer_to_words,
    month_from_name, month_name, month_short_name, parse_date, parse_monetary_string, round_legal,
    round_legal_decimal, try_format_currency, try_format_percentage, try_parse_date, try_parse_monetary_string,
    try_round_legal, Amount, DateInput, DateStyle, LEGAL_PLACES, MONTHS_ES, MONTHS_ES_SHORT,
    ZERO_CURRENCY, ZERO_PERCENTAGE,
};
pub use users::{AccessLevel, CredentialStore, NewUser, SqliteUserStore, User};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
