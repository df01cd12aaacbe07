//! Shared utilities for `tracker_dash`.
//!
//! - Time parsing and formatting (remote timestamps, query date literals)

pub mod time;

pub use time::{format_timestamp, parse_query_date, parse_remote_timestamp, whole_days_between};
