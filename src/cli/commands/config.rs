use super::print_json;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct ConfigOutput {
    workspace: Option<String>,
    values: std::collections::BTreeMap<String, String>,
}

/// Execute the config command: print the merged configuration with secrets
/// masked.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or parsed.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let loaded = config::load_for_command(cli)?;
    let output = ConfigOutput {
        workspace: loaded
            .workspace
            .as_ref()
            .map(|p| p.display().to_string()),
        values: loaded.layer.redacted_entries(),
    };

    if json {
        return print_json(&output);
    }

    match &output.workspace {
        Some(dir) => println!("workspace: {dir}"),
        None => println!("workspace: (none)"),
    }
    for (key, value) in &output.values {
        println!("{key}: {value}");
    }
    Ok(())
}
