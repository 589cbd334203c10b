//! Styled terminal output.
//!
//! Status lines go to stderr so stdout stays clean for URLs and downloaded
//! bytes.

use console::{Term, style};
use std::fmt::Display;
use storage_provider::{DeleteOutcome, UploadResult};
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub struct Output {
    status: Term,
    data: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            status: Term::stderr(),
            data: Term::stdout(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.status
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        drop(
            self.status
                .write_line(&format!("{} {}", style("✗").red().bold(), message)),
        );
    }

    pub fn labeled(&self, label: impl Display, value: impl Display) {
        drop(
            self.status
                .write_line(&format!("  {}: {}", style(label).dim(), value)),
        );
    }

    /// Print a plain value on stdout.
    pub fn value(&self, value: impl Display) {
        drop(self.data.write_line(&value.to_string()));
    }

    pub fn uploaded(&self, filename: &str, result: &UploadResult) {
        self.success(format!("Uploaded {}", style(filename).white().bold()));
        self.labeled("key", &result.key);
        self.value(&result.url);
    }

    pub fn delete_report(&self, report: &[DeleteOutcome]) {
        let rows: Vec<DeleteRow> = report.iter().map(DeleteRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        self.value(table);
    }
}

#[derive(Tabled)]
struct DeleteRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Deleted")]
    deleted: &'static str,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&DeleteOutcome> for DeleteRow {
    fn from(outcome: &DeleteOutcome) -> Self {
        Self {
            key: outcome.file_key.clone(),
            deleted: if outcome.success { "yes" } else { "no" },
            error: outcome.error.clone().unwrap_or_default(),
        }
    }
}
