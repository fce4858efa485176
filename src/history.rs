use crate::score::Outcome;
use crate::util::{mean, std_dev};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Shared by the writer and the reader so the columns cannot drift;
// rows are matched to fields by header name on the way back in.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    completed_at: String,
    test_id: String,
    percentage: u32,
    correct_count: usize,
    total_questions: usize,
    passed: bool,
    elapsed_secs: u32,
    warnings: u32,
}

/// Aggregate view over recorded attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub attempts: usize,
    pub passed: usize,
    pub mean_percentage: f64,
    pub std_dev_percentage: f64,
}

/// Append-only CSV log of completed sessions, one row per finalized
/// outcome. The header is written on first use.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "examen") {
            pd.data_local_dir().join("history.csv")
        } else {
            PathBuf::from("examen_history.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, test_id: &str, outcome: &Outcome) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(HistoryRow {
            completed_at: outcome.completed_at.format("%c").to_string(),
            test_id: test_id.to_string(),
            percentage: outcome.percentage,
            correct_count: outcome.correct_count,
            total_questions: outcome.total_questions,
            passed: outcome.passed,
            elapsed_secs: outcome.elapsed_secs,
            warnings: outcome.warning_count,
        })?;
        writer.flush()?;

        Ok(())
    }

    /// None when the log is missing, unreadable or empty.
    pub fn summary(&self) -> Option<Summary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .ok()?;

        let mut percentages: Vec<f64> = Vec::new();
        let mut passed = 0usize;

        for row in reader.deserialize::<HistoryRow>() {
            let row = row.ok()?;
            percentages.push(f64::from(row.percentage));
            if row.passed {
                passed += 1;
            }
        }

        Some(Summary {
            attempts: percentages.len(),
            passed,
            mean_percentage: mean(&percentages)?,
            std_dev_percentage: std_dev(&percentages)?,
        })
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
