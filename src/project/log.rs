use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::project::layout::ProjectLayout;

/// Appends invocation and exit records to a project's command history.
///
/// One value lives for one invocation of the binary. Writes are best-effort:
/// a failure to log never fails the command being logged.
#[derive(Debug, Clone)]
pub struct CommandLog {
    path: PathBuf,
}

impl CommandLog {
    /// Open the history of `layout`, or `None` if the project has no log directory
    pub fn open(layout: &ProjectLayout) -> Option<Self> {
        if layout.logs.is_dir() {
            Some(Self {
                path: layout.command_history(),
            })
        } else {
            debug!("SONAR log directory not found; command line and output will not be saved");
            None
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the command line that started this run
    pub fn record_start<S: AsRef<str>>(&self, args: &[S]) {
        self.append(&format!(
            "\n{} -- SONAR {} run with command:\n\t{}\n",
            timestamp(),
            env!("CARGO_PKG_VERSION"),
            format_command(args)
        ));
    }

    /// Record how the run ended
    pub fn record_exit(&self, error: Option<&str>) {
        let entry = match error {
            None => format!("{} -- Program finished successfully\n", timestamp()),
            Some(message) => format!(
                "{} -- Program exited with error:\n\t{}\n",
                timestamp(),
                indent(message)
            ),
        };
        self.append(&entry);
    }

    fn append(&self, entry: &str) {
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        if let Err(e) = written {
            debug!("Could not write to {}: {e}", self.path.display());
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%c").to_string()
}

/// Join arguments with spaces, quoting any that contain whitespace
pub fn format_command<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.contains(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn indent(message: &str) -> String {
    message.trim().replace('\n', "\n\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_logs() -> (tempfile::TempDir, ProjectLayout) {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = ProjectLayout::new(dir.path());
        std::fs::create_dir_all(&layout.logs).unwrap();
        (dir, layout)
    }

    #[test]
    fn test_no_log_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(CommandLog::open(&ProjectLayout::new(dir.path())).is_none());
    }

    #[test]
    fn test_format_command_quotes_whitespace() {
        let args = ["sonar", "check-frameshift", "my reads.fa", "out.fa"];
        assert_eq!(
            format_command(&args),
            "sonar check-frameshift \"my reads.fa\" out.fa"
        );
    }

    #[test]
    fn test_start_and_success() {
        let (_dir, layout) = project_with_logs();
        let log = CommandLog::open(&layout).unwrap();
        log.record_start(&["sonar", "list-ids", "-f", "reads.fa"]);
        log.record_exit(None);

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.starts_with('\n'));
        assert!(text.contains(" run with command:\n\tsonar list-ids -f reads.fa\n"));
        assert!(text.trim_end().ends_with("-- Program finished successfully"));
    }

    #[test]
    fn test_error_is_indented() {
        let (_dir, layout) = project_with_logs();
        let log = CommandLog::open(&layout).unwrap();
        log.record_exit(Some("Input file not found\ncaused by: reads.fa\n"));

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.contains(
            "-- Program exited with error:\n\tInput file not found\n\tcaused by: reads.fa\n"
        ));
    }

    #[test]
    fn test_appends_across_runs() {
        let (_dir, layout) = project_with_logs();
        for _ in 0..2 {
            let log = CommandLog::open(&layout).unwrap();
            log.record_start(&["sonar"]);
            log.record_exit(None);
        }
        let text = std::fs::read_to_string(layout.command_history()).unwrap();
        assert_eq!(text.matches("Program finished successfully").count(), 2);
    }
}
