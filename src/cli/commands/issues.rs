use super::print_json;
use crate::cli::IssuesArgs;
use crate::config::{self, CliOverrides};
use crate::dashboard::{Dashboard, Paging};
use crate::error::Result;
use crate::fetch::IssuePage;
use crate::format::{render_issue_page, terminal_width};

/// Execute the issues command.
///
/// # Errors
///
/// Returns an error if the filters are invalid, the source or store is
/// unavailable, or the page parameters are zero.
pub fn execute(args: &IssuesArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let loaded = config::load_for_command(cli)?;
    let filters = args.filters.to_filter_set()?;

    let page = if args.cached {
        let storage = loaded.storage()?;
        let issues = storage.list_issues(&filters.unwrap_or_default())?;
        if args.all {
            IssuePage::single(issues)
        } else {
            IssuePage::paginate(issues, args.page, args.per_page)?
        }
    } else {
        let paging = if args.all {
            Paging::All
        } else {
            Paging::Page {
                page: args.page,
                per_page: args.per_page,
            }
        };
        Dashboard::new(loaded.source()?).list_issues(filters.as_ref(), paging)?
    };

    if json {
        print_json(&page)
    } else {
        print!("{}", render_issue_page(&page, terminal_width()));
        Ok(())
    }
}
