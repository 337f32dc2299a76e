use serde::Serialize;
use std::fmt;

/// Summary statistics over per-barcode read abundance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbundanceSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl AbundanceSummary {
    /// Builds a summary from per-barcode read counts, or `None` if the
    /// partition holds no barcodes at all.
    pub fn from_counts(counts: &[usize]) -> Option<Self> {
        let min = *counts.iter().min()?;
        let max = *counts.iter().max()?;
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;

        Some(AbundanceSummary { min, max, mean })
    }
}

impl fmt::Display for AbundanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "min = {}, max = {}, mean = {:.3}",
            self.min, self.max, self.mean
        )
    }
}
