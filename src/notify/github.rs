use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Issue, IssueTracker};
use crate::error::TrackerError;

// Fuzzy title search can return many issues; keep the exact one in range.
const SEARCH_LIMIT: &str = "200";

/// GitHub issues through the `gh` CLI, authenticated by the caller's
/// environment (`GH_TOKEN` in CI).
pub struct GhCliTracker {
    command: Vec<String>,
    repo: Option<String>,
    label_color: String,
}

impl GhCliTracker {
    pub fn new(repo: Option<String>, label_color: impl Into<String>) -> Self {
        Self {
            command: vec!["gh".to_string()],
            repo,
            label_color: label_color.into(),
        }
    }

    /// Run a different program in place of `gh`, e.g. `["sh", "wrapper.sh"]`.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        if !command.is_empty() {
            self.command = command;
        }
        self
    }

    async fn run(&self, args: &[&str]) -> Result<String, TrackerError> {
        let mut command = Command::new(&self.command[0]);
        command.args(&self.command[1..]).args(args);
        if let Some(repo) = &self.repo {
            command.args(["--repo", repo]);
        }

        let output = command.output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("gh {} failed: {}", args.first().copied().unwrap_or_default(), stderr);
            return Err(TrackerError::Command {
                command: format!("gh {}", args.iter().take(2).copied().collect::<Vec<_>>().join(" ")),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Search qualifier for an exact-phrase title search. Quotes cannot be
/// escaped inside the phrase, so they are dropped.
fn title_search(title: &str) -> String {
    format!("\"{}\" in:title", title.replace('"', ""))
}

#[async_trait]
impl IssueTracker for GhCliTracker {
    async fn search_open_by_title(&self, title: &str) -> Result<Vec<Issue>, TrackerError> {
        let search = title_search(title);
        let stdout = self
            .run(&[
                "issue", "list", "--state", "open", "--search", &search, "--json", "number,title",
                "--limit", SEARCH_LIMIT,
            ])
            .await?;

        Ok(serde_json::from_str(&stdout)?)
    }

    async fn ensure_label(&self, name: &str) -> Result<(), TrackerError> {
        self.run(&["label", "create", name, "--color", &self.label_color, "--force"])
            .await
            .map(|_| ())
    }

    async fn create_issue(&self, title: &str, body: &str, label: &str) -> Result<(), TrackerError> {
        self.run(&[
            "issue", "create", "--title", title, "--body", body, "--label", label,
        ])
        .await
        .map(|_| ())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    // Records its arguments one per line and answers like `gh`.
    const STUB_GH: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
case "$1 $2" in
  "issue list") echo '[{"number":7,"title":"Deal Alert: Echo"},{"number":9,"title":"Deal Alert: Echo 2"}]' ;;
  "label create") echo "HTTP 403: forbidden" >&2; exit 1 ;;
esac
"#;

    fn stub_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gear-alerts-gh-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("gh.sh"), STUB_GH).unwrap();
        dir
    }

    fn tracker(dir: &PathBuf, repo: Option<&str>) -> GhCliTracker {
        GhCliTracker::new(repo.map(str::to_string), "0E8A16").with_command(vec![
            "sh".to_string(),
            dir.join("gh.sh").to_string_lossy().into_owned(),
        ])
    }

    fn recorded_args(dir: &PathBuf) -> Vec<String> {
        fs::read_to_string(dir.join("args.txt"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn title_search_drops_quotes() {
        assert_eq!(title_search("Deal Alert: Echo"), "\"Deal Alert: Echo\" in:title");
        assert_eq!(title_search("Deal Alert: 12\" Mixer"), "\"Deal Alert: 12 Mixer\" in:title");
    }

    #[test]
    fn search_builds_exact_phrase_query_with_repo() {
        let dir = stub_dir("search");
        let issues = tokio_test::block_on(
            tracker(&dir, Some("me/gear")).search_open_by_title("Deal Alert: Echo"),
        )
        .unwrap();

        assert_eq!(
            recorded_args(&dir),
            vec![
                "issue", "list", "--state", "open", "--search", "\"Deal Alert: Echo\" in:title",
                "--json", "number,title", "--limit", "200", "--repo", "me/gear",
            ]
        );
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], Issue { number: 7, title: "Deal Alert: Echo".to_string() });
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn create_without_repo_passes_no_repo_flag() {
        let dir = stub_dir("create");
        tokio_test::block_on(tracker(&dir, None).create_issue("Deal Alert: Echo", "| table |", "deal-alert"))
            .unwrap();

        assert_eq!(
            recorded_args(&dir),
            vec![
                "issue", "create", "--title", "Deal Alert: Echo", "--body", "| table |", "--label",
                "deal-alert",
            ]
        );
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let dir = stub_dir("label");
        let result = tokio_test::block_on(tracker(&dir, None).ensure_label("deal-alert"));

        match result {
            Err(TrackerError::Command { command, code, stderr }) => {
                assert_eq!(command, "gh label create");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "HTTP 403: forbidden");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        fs::remove_dir_all(dir).ok();
    }
}
