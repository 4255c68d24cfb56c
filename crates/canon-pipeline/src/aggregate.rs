//! Results aggregation: binary predictions, verdict breakdown, bias check.

use std::fs;
use std::path::{Path, PathBuf};

use canon_core::constants::MAX_RATIONALE_CHARS;
use canon_core::errors::BatchError;
use canon_core::models::{compare_claim_ids, truncate_chars, Verdict, VerdictRecord};
use serde::Serialize;

/// File holding the three-column predictions.
pub const RESULTS_FILE: &str = "results.csv";
/// File holding predictions plus claim metadata, verdict and confidence.
pub const EXTENDED_RESULTS_FILE: &str = "results_extended.csv";

const ELLIPSIS: &str = "...";

/// Supported counts as consistent (1); anything else as not (0).
pub fn prediction_for(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::Supported => 1,
        Verdict::Contradicted | Verdict::Undetermined => 0,
    }
}

/// Reasoning cut to the rationale limit, ellipsis included.
pub fn rationale(reasoning: &str) -> String {
    if reasoning.chars().count() <= MAX_RATIONALE_CHARS {
        return reasoning.to_string();
    }
    let keep = MAX_RATIONALE_CHARS - ELLIPSIS.len();
    format!("{}{ELLIPSIS}", truncate_chars(reasoning, keep))
}

/// Verdict tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub supported: usize,
    pub contradicted: usize,
    pub undetermined: usize,
}

impl VerdictCounts {
    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Supported => self.supported += 1,
            Verdict::Contradicted => self.contradicted += 1,
            Verdict::Undetermined => self.undetermined += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.supported + self.contradicted + self.undetermined
    }

    /// Share of SUPPORTED verdicts; 0 when there are none at all.
    pub fn supported_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.supported as f64 / total as f64,
        }
    }

    /// More than `threshold` of all verdicts are SUPPORTED.
    pub fn exceeds_bias(&self, threshold: f64) -> bool {
        self.total() > 0 && self.supported_fraction() > threshold
    }
}

impl FromIterator<Verdict> for VerdictCounts {
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        let mut counts = Self::default();
        for verdict in iter {
            counts.add(verdict);
        }
        counts
    }
}

/// One claim's line in the results files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    #[serde(rename = "Story ID")]
    pub claim_id: String,
    #[serde(rename = "Prediction")]
    pub prediction: u8,
    #[serde(rename = "Rationale")]
    pub rationale: String,
    pub book_name: String,
    pub character: String,
    pub verdict: Verdict,
    pub confidence: f64,
}

impl From<&VerdictRecord> for ResultRow {
    fn from(record: &VerdictRecord) -> Self {
        Self {
            claim_id: record.claim_id.clone(),
            prediction: prediction_for(record.verdict),
            rationale: rationale(&record.reasoning),
            book_name: record.analysis.book_name.clone(),
            character: record.analysis.character.clone(),
            verdict: record.verdict,
            confidence: record.confidence,
        }
    }
}

#[derive(Serialize)]
struct PredictionRow<'a> {
    #[serde(rename = "Story ID")]
    claim_id: &'a str,
    #[serde(rename = "Prediction")]
    prediction: u8,
    #[serde(rename = "Rationale")]
    rationale: &'a str,
}

/// Every stored verdict, summarised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsSummary {
    /// Sorted by claim id, numeric ids first.
    pub rows: Vec<ResultRow>,
    pub counts: VerdictCounts,
    pub average_confidence: f64,
    pub supported_fraction: f64,
    pub bias_warning: bool,
}

impl ResultsSummary {
    pub fn from_records(records: &[VerdictRecord], bias_threshold: f64) -> Self {
        let mut rows: Vec<ResultRow> = records.iter().map(ResultRow::from).collect();
        rows.sort_by(|a, b| compare_claim_ids(&a.claim_id, &b.claim_id));

        let counts: VerdictCounts = rows.iter().map(|r| r.verdict).collect();
        let average_confidence = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.confidence).sum::<f64>() / rows.len() as f64
        };

        Self {
            supported_fraction: counts.supported_fraction(),
            bias_warning: counts.exceeds_bias(bias_threshold),
            rows,
            counts,
            average_confidence,
        }
    }

    /// Rows predicted consistent.
    pub fn predicted_consistent(&self) -> usize {
        self.rows.iter().filter(|r| r.prediction == 1).count()
    }

    /// Writes `results.csv` and `results_extended.csv` into `dir`.
    pub fn write_csv(&self, dir: &Path) -> Result<(PathBuf, PathBuf), BatchError> {
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

        let results = dir.join(RESULTS_FILE);
        let mut writer = csv::Writer::from_path(&results).map_err(|e| write_error(&results, e))?;
        for row in &self.rows {
            writer
                .serialize(PredictionRow {
                    claim_id: &row.claim_id,
                    prediction: row.prediction,
                    rationale: &row.rationale,
                })
                .map_err(|e| write_error(&results, e))?;
        }
        writer.flush().map_err(|e| write_error(&results, e))?;

        let extended = dir.join(EXTENDED_RESULTS_FILE);
        let mut writer = csv::Writer::from_path(&extended).map_err(|e| write_error(&extended, e))?;
        for row in &self.rows {
            writer.serialize(row).map_err(|e| write_error(&extended, e))?;
        }
        writer.flush().map_err(|e| write_error(&extended, e))?;

        Ok((results, extended))
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> BatchError {
    BatchError::ResultsWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
