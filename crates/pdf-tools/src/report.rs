//! Compression outcome

use crate::params::MIN_EFFECTIVE_SAVINGS;
use serde::Serialize;

/// Before/after sizes of a compression run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub input_size: u64,
    pub output_size: u64,
    /// Negative when the output grew
    pub savings: i64,
    /// Never below zero
    pub savings_percent: f64,
    /// False means "already optimized"
    pub is_effective: bool,
}

impl CompressionReport {
    pub fn new(input_size: u64, output_size: u64) -> Self {
        let savings = input_size as i64 - output_size as i64;
        let savings_percent = if input_size == 0 {
            0.0
        } else {
            (savings as f64 / input_size as f64 * 100.0).max(0.0)
        };

        Self {
            input_size,
            output_size,
            savings,
            savings_percent,
            is_effective: savings > MIN_EFFECTIVE_SAVINGS as i64,
        }
    }
}
