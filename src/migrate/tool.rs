//! Migration tool detection.

use std::path::PathBuf;
use std::process::Command;

/// Information about the external migration tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `--version` output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Check whether `name` resolves on `PATH` and answers `--version`.
pub fn check_tool(name: &str) -> ToolInfo {
    let Ok(path) = which::which(name) else {
        return ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        };
    };

    let version = match Command::new(&path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            // Some tools print their version to stderr.
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            String::from_utf8_lossy(&text)
                .lines()
                .next()
                .map(|s| s.trim().to_string())
        }
        _ => None,
    };

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: Some(path),
    }
}
