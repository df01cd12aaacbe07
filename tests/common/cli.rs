use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct JdRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl JdRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }

    /// The structured error document, skipping any log lines before it.
    pub fn stderr_json(&self) -> serde_json::Value {
        let start = self
            .stderr
            .find("{\n")
            .unwrap_or_else(|| panic!("no JSON on stderr: {}", self.stderr));
        serde_json::from_str(&self.stderr[start..])
            .unwrap_or_else(|e| panic!("stderr is not JSON ({e}): {}", self.stderr))
    }
}

/// Isolated working directory with its own HOME.
pub struct JdWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl JdWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }
}

pub fn run_jd<I, S>(workspace: &JdWorkspace, args: I) -> JdRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_jd_with_env(workspace, args, std::iter::empty::<(String, String)>())
}

pub fn run_jd_with_env<I, S, E, K, V>(workspace: &JdWorkspace, args: I, env_vars: E) -> JdRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jd"));
    cmd.current_dir(&workspace.root);
    for var in ["JIRA_BASE_URL", "JIRA_EMAIL", "JIRA_API_TOKEN", "JD_DIR", "JD_SOURCE"] {
        cmd.env_remove(var);
    }
    cmd.env("HOME", &workspace.root);
    cmd.env("RUST_LOG", "tracker_dash=debug");
    cmd.args(args);
    cmd.envs(env_vars);

    let output = cmd.output().expect("run jd");
    JdRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
