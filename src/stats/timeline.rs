//! Created/resolved counts per UTC day.

use crate::model::Issue;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Two aligned series, oldest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(rename = "created_timeline")]
    pub created: Vec<DayCount>,
    #[serde(rename = "resolved_timeline")]
    pub resolved: Vec<DayCount>,
}

/// Build the `days`-long timeline ending on `today` (inclusive).
///
/// Days without activity are present with a zero count. Issues are bucketed
/// by the UTC date of their creation and resolution instants.
#[must_use]
pub fn timeline(issues: &[Issue], today: NaiveDate, days: u32) -> Timeline {
    let mut created: HashMap<NaiveDate, u64> = HashMap::new();
    let mut resolved: HashMap<NaiveDate, u64> = HashMap::new();

    for issue in issues {
        if let Some(at) = issue.created_at {
            *created.entry(at.date_naive()).or_insert(0) += 1;
        }
        if let Some(at) = issue.resolved_at {
            *resolved.entry(at.date_naive()).or_insert(0) += 1;
        }
    }

    let series = |counts: &HashMap<NaiveDate, u64>| -> Vec<DayCount> {
        (0..i64::from(days))
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                DayCount {
                    date,
                    count: counts.get(&date).copied().unwrap_or(0),
                }
            })
            .collect()
    };

    Timeline {
        created: series(&created),
        resolved: series(&resolved),
    }
}
