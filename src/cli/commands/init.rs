use crate::config::{DEFAULT_DB_FILENAME, WORKSPACE_DIR};
use crate::error::{DashError, Result};
use crate::storage::SqliteStorage;
use std::fs;
use std::path::Path;
use tracing::info;

const CONFIG_TEMPLATE: &str = r"# Dashboard configuration
# source: remote            # or: fixture
# fixture: issues.json
# timeout-secs: 30
# jira:
#   base-url: https://your-domain.atlassian.net
#   email: you@example.com
#   # Prefer JIRA_API_TOKEN in the environment over storing the token here.
";

const GITIGNORE: &str = r"# Database
*.db
*.db-shm
*.db-wal

# Logs
*.log
";

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `force` is not
/// set, or an error if the directory or database cannot be created.
pub fn execute(force: bool, root_dir: Option<&Path>) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let workspace = base_dir.join(WORKSPACE_DIR);
    let db_path = workspace.join(DEFAULT_DB_FILENAME);

    if workspace.exists() {
        if db_path.exists() {
            if !force {
                return Err(DashError::AlreadyInitialized { path: db_path });
            }
            for suffix in ["", "-wal", "-shm"] {
                let path = workspace.join(format!("{DEFAULT_DB_FILENAME}{suffix}"));
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
    } else {
        fs::create_dir_all(&workspace)?;
    }

    SqliteStorage::open(&db_path)?;

    let config_path = workspace.join("config.yaml");
    if !config_path.exists() {
        fs::write(config_path, CONFIG_TEMPLATE)?;
    }

    let gitignore_path = workspace.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE)?;
    }

    info!(path = %workspace.display(), "Initialized workspace");
    println!("Initialized dashboard workspace in {WORKSPACE_DIR}/");
    Ok(())
}
