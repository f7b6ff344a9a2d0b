/// Bundle data model shared by both submission paths.
///
/// A bundle is an ordered list of fee-prioritized transfers plus exactly
/// one validator tip, which is always the **last** entry — the protocol
/// convention that lets the block-engine identify and validate the bundle.
use serde::{Deserialize, Serialize};

/// Label used for the tip entry in every report.
pub const TIP_LABEL: &str = "Jito Tip";

/// Maximum length of a captured per-item error message.
const MAX_ERROR_LEN: usize = 120;

// ─── Bundle item ────────────────────────────────────────────────────────────

/// One requested transfer within a bundle, as entered by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleItem {
    /// Caller-assigned identifier, used for UI correlation only.
    pub id: String,
    /// Base-58 recipient address. Validated at submission time.
    pub recipient: String,
    /// Transfer amount in SOL. Must be positive.
    pub amount_sol: f64,
    /// Priority fee in micro-lamports per compute unit.
    /// `0` means no compute-budget instructions are attached.
    pub priority_fee: u64,
    /// Free-text display label, copied into the result entry.
    pub label: String,
}

impl BundleItem {
    pub fn new(
        id: impl Into<String>,
        recipient: impl Into<String>,
        amount_sol: f64,
        priority_fee: u64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            recipient: recipient.into(),
            amount_sol,
            priority_fee,
            label: label.into(),
        }
    }
}

// ─── Per-entry result ───────────────────────────────────────────────────────

/// Outcome of one bundle entry (one per item, plus one for the tip).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleResult {
    /// Label copied from the source item (or [`TIP_LABEL`] for the tip).
    pub label: String,
    /// Base-58 transaction signature; empty string on failure.
    pub signature: String,
    pub success: bool,
    /// Wall-clock duration of this entry's submission + confirmation,
    /// measured independently per entry.
    pub time_ms: u64,
    /// Short failure reason; only present when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BundleResult {
    pub fn ok(label: impl Into<String>, signature: impl Into<String>, time_ms: u64) -> Self {
        Self {
            label: label.into(),
            signature: signature.into(),
            success: true,
            time_ms,
            error: None,
        }
    }

    pub fn failed(label: impl Into<String>, time_ms: u64, error: impl std::fmt::Display) -> Self {
        Self {
            label: label.into(),
            signature: String::new(),
            success: false,
            time_ms,
            error: Some(truncate_error(&error.to_string())),
        }
    }
}

/// Truncate a collaborator error message to a short display string.
pub fn truncate_error(msg: &str) -> String {
    if msg.len() <= MAX_ERROR_LEN {
        return msg.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &msg[..end])
}

// ─── Bundle-level outcome ───────────────────────────────────────────────────

/// Aggregate disposition of one bundle submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleOutcome {
    /// Every entry landed (or the atomic path reported Landed).
    Confirmed,
    /// Sequential path only: at least one but not all entries failed.
    PartiallyFailed,
    /// Every entry failed, or the attempt aborted before any result.
    Failed,
}

impl std::fmt::Display for BundleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::PartiallyFailed => write!(f, "partially-failed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// The full ordered result of one bundle submission: one entry per item,
/// in input order, with the tip entry always last.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleReport {
    pub results: Vec<BundleResult>,
    /// Total elapsed time. Sequential path: sum of per-entry times.
    /// Atomic path: wall-clock duration of the whole bundle.
    pub total_time_ms: u64,
}

impl BundleReport {
    /// Build a report from sequential per-entry results; the total is the
    /// sum of the independently measured entry times.
    pub fn from_sequential(results: Vec<BundleResult>) -> Self {
        let total_time_ms = results.iter().map(|r| r.time_ms).sum();
        Self {
            results,
            total_time_ms,
        }
    }

    /// Build a report with an explicitly measured total (atomic path).
    pub fn with_total(results: Vec<BundleResult>, total_time_ms: u64) -> Self {
        Self {
            results,
            total_time_ms,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// AND-reduction across entries, with the partial case called out.
    pub fn outcome(&self) -> BundleOutcome {
        let ok = self.succeeded();
        if ok == self.results.len() && !self.results.is_empty() {
            BundleOutcome::Confirmed
        } else if ok > 0 {
            BundleOutcome::PartiallyFailed
        } else {
            BundleOutcome::Failed
        }
    }
}
