use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One swap on the execution venue. Amounts are raw integer units of the
/// input asset, as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_raw: String,
    pub slippage_pct: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwapOutcome {
    Filled {
        signature: String,
        /// Raw units spent.
        input_amount: u64,
        /// Raw units received.
        output_amount: u64,
    },
    Failed {
        error: String,
    },
}

impl SwapOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, SwapOutcome::Filled { .. })
    }
}

/// Signing identity plus swap venue. Failures are returned as
/// [`SwapOutcome::Failed`]; callers still guard against panics.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    /// Whether a funded, connected identity is available.
    fn is_ready(&self) -> bool;

    async fn execute_swap(&self, request: SwapRequest) -> SwapOutcome;
}

/// Identity for simulated trading. It is always ready and refuses every
/// real swap, so test-mode bots can run without a wallet.
#[derive(Debug, Default, Clone, Copy)]
pub struct PaperExecutor;

#[async_trait]
impl SwapExecutor for PaperExecutor {
    fn is_ready(&self) -> bool {
        true
    }

    async fn execute_swap(&self, request: SwapRequest) -> SwapOutcome {
        tracing::warn!(label = %request.label, "paper identity cannot submit swaps");
        SwapOutcome::Failed {
            error: "paper identity cannot submit live swaps".to_string(),
        }
    }
}

/// Convert a UI amount into raw integer units.
pub fn to_raw_amount(amount: f64, decimals: u8) -> Option<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let raw = (amount * 10f64.powi(decimals as i32)).floor();
    if raw < 1.0 || raw > u64::MAX as f64 {
        return None;
    }
    Some(raw as u64)
}

pub fn from_raw_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_amount_conversion() {
        assert_eq!(to_raw_amount(0.1, 9), Some(100_000_000));
        assert_eq!(to_raw_amount(15.5, 6), Some(15_500_000));
        assert_eq!(to_raw_amount(0.0, 9), None);
        assert_eq!(to_raw_amount(1e-12, 6), None);
        assert!((from_raw_amount(2_500_000, 6) - 2.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn paper_executor_is_ready_but_never_fills() {
        let exec = PaperExecutor;
        assert!(exec.is_ready());
        let out = exec
            .execute_swap(SwapRequest {
                input_mint: "a".to_string(),
                output_mint: "b".to_string(),
                amount_raw: "1".to_string(),
                slippage_pct: 0.5,
                label: "Stop Loss".to_string(),
            })
            .await;
        assert!(!out.is_filled());
    }
}
