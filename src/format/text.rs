//! Plain-text rendering for terminal output.

use crate::dashboard::SyncReport;
use crate::fetch::IssuePage;
use crate::model::{Issue, PriorityTier, Project, ProjectVersion, UNASSIGNED_LABEL};
use crate::stats::{BreakdownEntry, DashboardStats, FilterOptions, PersonOption, Timeline};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const KEY_WIDTH: usize = 12;
const STATUS_WIDTH: usize = 14;
const PRIORITY_WIDTH: usize = 9;
const PERSON_WIDTH: usize = 18;

/// Terminal width from `COLUMNS`, else 80.
#[must_use]
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(80)
}

/// Truncate to `max_len` visible columns, marking the cut with "...".
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }
    let (budget, ellipsis) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };

    let mut used = 0;
    let mut out = String::new();
    for c in title.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Left-align `value` in `width` visible columns, truncating if needed.
fn cell(value: &str, width: usize) -> String {
    let text = truncate_title(value, width);
    let pad = width.saturating_sub(UnicodeWidthStr::width(text.as_str()));
    format!("{text}{}", " ".repeat(pad))
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

/// One issue per line: key, status, priority, assignee, summary.
#[must_use]
pub fn format_issue_line(issue: &Issue, width: usize) -> String {
    let fixed = KEY_WIDTH + STATUS_WIDTH + PRIORITY_WIDTH + PERSON_WIDTH + 4;
    let summary_width = width.saturating_sub(fixed).max(10);
    format!(
        "{} {} {} {} {}",
        cell(&issue.key, KEY_WIDTH),
        cell(&issue.status, STATUS_WIDTH),
        cell(issue.priority.as_deref().unwrap_or("-"), PRIORITY_WIDTH),
        cell(
            issue.assignee_name.as_deref().unwrap_or(UNASSIGNED_LABEL),
            PERSON_WIDTH
        ),
        truncate_title(first_line(&issue.summary), summary_width),
    )
    .trim_end()
    .to_string()
}

#[must_use]
pub fn render_issue_page(page: &IssuePage, width: usize) -> String {
    if page.issues.is_empty() {
        return "No issues found.\n".to_string();
    }
    let mut out = String::new();
    for issue in &page.issues {
        out.push_str(&format_issue_line(issue, width));
        out.push('\n');
    }
    out.push_str(&format!(
        "\nPage {}/{} ({} issues total)\n",
        page.current_page, page.pages, page.total
    ));
    out
}

fn render_breakdown(out: &mut String, title: &str, entries: &[BreakdownEntry]) {
    out.push_str(&format!("\n{title}:\n"));
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    let width = entries
        .iter()
        .map(|e| UnicodeWidthStr::width(e.key.as_str()))
        .max()
        .unwrap_or(0)
        .min(32);
    for entry in entries {
        out.push_str(&format!("  {} {:>6}\n", cell(&entry.key, width), entry.count));
    }
}

#[must_use]
pub fn render_stats(stats: &DashboardStats) -> String {
    let mut out = String::new();
    out.push_str("Summary:\n");
    out.push_str(&format!("  Total issues:         {}\n", stats.total_issues));
    out.push_str(&format!("  Created (last 30d):   {}\n", stats.recent_issues));
    out.push_str(&format!("  Resolved (last 30d):  {}\n", stats.resolved_issues));

    render_breakdown(&mut out, "By status", &stats.status_distribution);
    render_breakdown(&mut out, "By type", &stats.type_distribution);
    render_breakdown(&mut out, "By priority", &stats.priority_distribution);
    render_breakdown(&mut out, "By assignee", &stats.assignee_distribution);
    render_breakdown(&mut out, "By reporter", &stats.reporter_distribution);
    render_breakdown(&mut out, "By fix version", &stats.version_distribution);

    out.push_str("\nBacklog aging:\n");
    out.push_str(&format!("  {} {:>6}", cell("", 16), "Total"));
    for tier in PriorityTier::ALL {
        out.push_str(&format!(" {:>15}", tier.as_str()));
    }
    out.push('\n');
    for row in &stats.backlog_aging {
        out.push_str(&format!("  {} {:>6}", cell(&row.time_range, 16), row.total));
        for tier in PriorityTier::ALL {
            out.push_str(&format!(" {:>15}", row.tier(tier)));
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn render_timeline(timeline: &Timeline) -> String {
    let mut out = format!("{:<10} {:>8} {:>8}\n", "Date", "Created", "Resolved");
    for (created, resolved) in timeline.created.iter().zip(&timeline.resolved) {
        out.push_str(&format!(
            "{} {:>8} {:>8}\n",
            created.date.format("%Y-%m-%d"),
            created.count,
            resolved.count
        ));
    }
    out
}

fn render_values(out: &mut String, title: &str, values: &[String]) {
    out.push_str(&format!("{title}: "));
    if values.is_empty() {
        out.push_str("(none)\n");
    } else {
        out.push_str(&values.join(", "));
        out.push('\n');
    }
}

fn render_people(out: &mut String, title: &str, people: &[PersonOption]) {
    out.push_str(&format!("{title}:\n"));
    if people.is_empty() {
        out.push_str("  (none)\n");
    }
    for person in people {
        if person.id == person.name {
            out.push_str(&format!("  {}\n", person.name));
        } else {
            out.push_str(&format!("  {} ({})\n", person.name, person.id));
        }
    }
}

#[must_use]
pub fn render_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    render_values(&mut out, "Statuses", &options.statuses);
    render_values(&mut out, "Types", &options.types);
    render_values(&mut out, "Priorities", &options.priorities);
    render_values(&mut out, "Fix versions", &options.versions);
    render_people(&mut out, "Assignees", &options.assignees);
    render_people(&mut out, "Reporters", &options.reporters);
    out
}

#[must_use]
pub fn render_projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found.\n".to_string();
    }
    projects
        .iter()
        .map(|p| {
            let lead = p.lead_name.as_deref().unwrap_or("-");
            format!("{} {} [{}] lead: {lead}\n", cell(&p.key, KEY_WIDTH), p.name, p.project_type)
        })
        .collect()
}

#[must_use]
pub fn render_versions(versions: &[ProjectVersion]) -> String {
    if versions.is_empty() {
        return "No versions found.\n".to_string();
    }
    versions
        .iter()
        .map(|v| {
            let state = if v.archived {
                "archived"
            } else if v.released {
                "released"
            } else {
                "unreleased"
            };
            let date = v
                .release_date
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
            format!("{} {} {date}\n", cell(&v.name, 20), cell(state, 10))
        })
        .collect()
}

#[must_use]
pub fn render_sync_report(report: &SyncReport) -> String {
    format!(
        "Synced {}: {} issues fetched ({} created, {} updated), {} versions\n",
        report.project_key, report.fetched, report.created, report.updated, report.versions
    )
}
