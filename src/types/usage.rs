//! Token usage accounting.

use serde::{Deserialize, Serialize};

/// Token counts for one or more model turns.
///
/// Field names match the debug wire format, where usage is reported as
/// `{"input": .., "output": .., "total": ..}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    /// Usage for a single reading.
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }

    /// Accumulate another reading into this one.
    pub fn add(&mut self, input: u64, output: u64) {
        self.input += input;
        self.output += output;
        self.total += input + output;
    }
}
