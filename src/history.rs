/// Completed-transaction history.
///
/// The orchestrator reports each successfully landed business transaction
/// (never the tip, never failures) upward as one history record for
/// display and metrics.
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Transfer,
    Swap,
    Bundle,
    Vault,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Failed,
}

/// One completed-transaction record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxRecord {
    pub kind: TxKind,
    pub signature: String,
    pub amount_sol: f64,
    pub status: TxStatus,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
    pub time_ms: u64,
}

impl TxRecord {
    pub fn confirmed_bundle_item(signature: String, amount_sol: f64, time_ms: u64) -> Self {
        Self {
            kind: TxKind::Bundle,
            signature,
            amount_sol,
            status: TxStatus::Confirmed,
            timestamp_ms: now_ms(),
            time_ms,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Accepts completed-transaction records.
pub trait HistorySink: Send + Sync {
    fn record(&self, record: TxRecord);
}

/// In-memory history with the derived aggregates the console displays.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<TxRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TxRecord> {
        self.records.lock().expect("history lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("history lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean confirmation time across all records, in milliseconds.
    pub fn avg_confirm_ms(&self) -> f64 {
        let records = self.records.lock().expect("history lock poisoned");
        if records.is_empty() {
            return 0.0;
        }
        records.iter().map(|r| r.time_ms as f64).sum::<f64>() / records.len() as f64
    }

    pub fn clear(&self) {
        self.records.lock().expect("history lock poisoned").clear();
    }
}

impl HistorySink for MemoryHistory {
    fn record(&self, record: TxRecord) {
        self.records.lock().expect("history lock poisoned").push(record);
    }
}
