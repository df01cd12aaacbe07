//! Client-side fix-version filter.
//!
//! The remote's `fixVersion =` clause is unreliable for version names that
//! differ only in case or surrounding whitespace, so exhaustive fetches
//! re-check every issue locally.

use crate::model::{Issue, has_fix_version};
use tracing::debug;

/// Keep only issues carrying `target` among their fix versions.
///
/// Comparison trims and lowercases both sides and requires exact equality.
#[must_use]
pub fn apply(issues: Vec<Issue>, target: &str) -> Vec<Issue> {
    let before = issues.len();
    let kept: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| has_fix_version(issue, target))
        .collect();
    debug!(target, before, after = kept.len(), "Applied fix-version filter");
    kept
}
