// 🧮 Formatters - shared by every court calculator
// Pure functions: no state, no I/O, safe to call from any thread.

pub mod currency;
pub mod dates;
pub mod rounding;
pub mod words;

pub use currency::{
    format_currency, format_currency_decimal, format_percentage, format_percentage_with,
    parse_monetary_string, try_format_currency, try_format_percentage, try_parse_monetary_string,
    Amount, ZERO_CURRENCY, ZERO_PERCENTAGE,
};
pub use dates::{
    days_in_month, format_date_ar, format_month_year, month_from_name, month_name,
    month_short_name, parse_date, try_parse_date, DateInput, DateStyle, MONTHS_ES,
    MONTHS_ES_SHORT,
};
pub use rounding::{round_legal, round_legal_decimal, try_round_legal, LEGAL_PLACES};
pub use words::{amount_to_words, integer_to_words};
