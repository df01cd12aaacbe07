//! CLI definitions and entry point.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::model::{CreatedRange, FilterSet};
use crate::util::parse_query_date;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Issue-tracker dashboard (remote search + `SQLite` cache)
#[derive(Parser, Debug)]
#[command(name = "jd", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to .jd/dashboard.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Issue source: remote or fixture
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Search-response JSON file to read issues from (implies --source fixture)
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Append logs as JSON lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            source: self.source.clone(),
            fixture: self.fixture.clone(),
            lock_timeout: self.lock_timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .jd workspace with an empty cache
    Init {
        /// Recreate the database if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List issues matching the filters
    #[command(alias = "list")]
    Issues(IssuesArgs),

    /// Dashboard statistics
    Stats(StatsArgs),

    /// Created/resolved counts per day
    Timeline(TimelineArgs),

    /// Distinct values for the filter dropdowns
    Options(FilterArgs),

    /// Mirror projects, issues and releases into the local cache
    Sync(SyncArgs),

    /// List projects
    Projects(CachedArgs),

    /// List a project's releases
    Versions(VersionsArgs),

    /// Show the effective configuration
    Config,
}

/// Filters shared by every read command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Project key
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Status name
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Assignee account id or display name
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Reporter account id or display name
    #[arg(long)]
    pub reporter: Option<String>,

    /// Issue type name
    #[arg(long = "type", short = 't')]
    pub issue_type: Option<String>,

    /// Priority name
    #[arg(long)]
    pub priority: Option<String>,

    /// Created on or after (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
    #[arg(long)]
    pub created_after: Option<String>,

    /// Created on or before (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
    #[arg(long)]
    pub created_before: Option<String>,

    /// Fix version name (case-insensitive, trimmed exact match)
    #[arg(long)]
    pub fix_version: Option<String>,
}

impl FilterArgs {
    /// Build the filter set; `None` when no filter was given.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed date bound.
    pub fn to_filter_set(&self) -> Result<Option<FilterSet>> {
        let after = self
            .created_after
            .as_deref()
            .map(|s| parse_query_date(s, "created-after"))
            .transpose()?;
        let before = self
            .created_before
            .as_deref()
            .map(|s| parse_query_date(s, "created-before"))
            .transpose()?;
        let created = (after.is_some() || before.is_some()).then_some(CreatedRange { after, before });

        let filters = FilterSet {
            project: non_blank(self.project.as_deref()),
            status: non_blank(self.status.as_deref()),
            assignee: non_blank(self.assignee.as_deref()),
            reporter: non_blank(self.reporter.as_deref()),
            issuetype: non_blank(self.issue_type.as_deref()),
            priority: non_blank(self.priority.as_deref()),
            created,
            fix_version: non_blank(self.fix_version.as_deref()),
        };
        Ok((!filters.is_empty()).then_some(filters))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Args, Debug, Clone)]
pub struct IssuesArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Issues per page
    #[arg(long, default_value_t = 50)]
    pub per_page: u64,

    /// Fetch every matching issue instead of one page
    #[arg(long, conflicts_with = "page")]
    pub all: bool,

    /// Read from the local cache instead of the source
    #[arg(long)]
    pub cached: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Aggregate the local cache instead of the source
    #[arg(long)]
    pub cached: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Number of days, ending today
    #[arg(long, default_value_t = 30)]
    pub days: u32,
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Project keys to mirror (default: every project; the project list is always refreshed)
    pub projects: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CachedArgs {
    /// Read from the local cache instead of the source
    #[arg(long)]
    pub cached: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VersionsArgs {
    /// Project key
    pub project: String,

    /// Read from the local cache instead of the source
    #[arg(long)]
    pub cached: bool,
}
