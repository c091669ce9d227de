//! Safety margin policy for retryable ticket estimation.

use serde::{Deserialize, Serialize};

/// Default increase applied to the raw submission fee, in percent.
pub const DEFAULT_SUBMISSION_FEE_PCT: u64 = 400;

/// Default increase applied to the raw gas estimate, in percent.
pub const DEFAULT_GAS_LIMIT_PCT: u64 = 50;

/// Percent increases applied on top of raw L2 estimates.
///
/// These absorb base fee and pricing drift between estimation and inclusion.
/// Overpayment is refunded on L2, underpayment makes the ticket fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryableMargins {
    /// Increase applied to the raw submission fee
    pub submission_fee_pct: u64,
    /// Increase applied to the raw execution gas estimate
    pub gas_limit_pct: u64,
}

impl Default for RetryableMargins {
    fn default() -> Self {
        Self {
            submission_fee_pct: DEFAULT_SUBMISSION_FEE_PCT,
            gas_limit_pct: DEFAULT_GAS_LIMIT_PCT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_margins() {
        let margins = RetryableMargins::default();
        assert_eq!(margins.submission_fee_pct, 400);
        assert_eq!(margins.gas_limit_pct, 50);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let margins: RetryableMargins = toml::from_str("gas_limit_pct = 20").unwrap();
        assert_eq!(margins.submission_fee_pct, DEFAULT_SUBMISSION_FEE_PCT);
        assert_eq!(margins.gas_limit_pct, 20);
    }
}
