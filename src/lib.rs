//! `tracker_dash`: issue-tracker dashboard aggregation.
//!
//! Issues are walked out of a remote search API (or a JSON fixture), normalized
//! into [`model::Issue`], and reduced to dashboard statistics: distributions,
//! recent/resolved counts, a backlog-aging matrix, a created/resolved timeline
//! and filter dropdown options. A `SQLite` store mirrors synced projects so the
//! same engine can run offline.
//!
//! Layering, bottom up:
//! - [`util`], [`model`], [`query`]: date normalization, domain types, JQL.
//! - [`remote`]: the [`remote::IssueSource`] capability (HTTP client, fixture).
//! - [`fetch`]: single-page and exhaustive pagination, post-fetch version filter.
//! - [`stats`]: the aggregation engine.
//! - [`storage`]: local cache.
//! - [`dashboard`]: the API the CLI calls, plus project sync.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod format;
pub mod logging;
pub mod model;
pub mod query;
pub mod remote;
pub mod stats;
pub mod storage;
pub mod util;

pub use error::{DashError, ErrorCode, Result, StructuredError};
