//! Reduction of per-channel outcomes into one overall dispatch status.

use super::fanout::DeliveryOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Every selected channel succeeded.
    Success,
    /// Some channels succeeded, some failed.
    PartialSuccess,
    /// Nothing was delivered: no channel matched, or every attempt failed.
    /// The two causes are deliberately merged; logs distinguish them.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub status: DispatchStatus,
    pub success: usize,
    pub failed: usize,
}

/// Pure reduction of an outcome list into counts and an overall status.
#[must_use]
pub fn aggregate(outcomes: &[DeliveryOutcome]) -> DispatchSummary {
    let success = outcomes.iter().filter(|o| o.success).count();
    let failed = outcomes.len() - success;

    let status = if success == 0 {
        DispatchStatus::Error
    } else if failed == 0 {
        DispatchStatus::Success
    } else {
        DispatchStatus::PartialSuccess
    };

    DispatchSummary {
        status,
        success,
        failed,
    }
}
