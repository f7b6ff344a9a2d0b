/// Bundle submission orchestration.
///
/// Drives one submission attempt at a time through a linear state
/// machine: `Idle → Building → Submitting → {Confirmed | PartiallyFailed
/// | Failed}`. The submitter path (atomic block-engine vs. sequential
/// fallback) is chosen at construction time behind [`SubmitBundle`]; the
/// orchestrator never branches on environment itself.
///
/// At most one submission may be in flight per orchestrator instance:
/// the signer is a shared resource and a concurrent second submission
/// would race it, so the idle gate rejects overlapping calls.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, instrument, warn};

use crate::bundle::{BundleItem, BundleOutcome, BundleReport};
use crate::error::{BundleError, Result};
use crate::history::{HistorySink, TxRecord};
use crate::submit::SubmitBundle;

/// Phase of the current (or last) submission attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundlePhase {
    Idle,
    Building,
    Submitting,
    Confirmed,
    PartiallyFailed,
    Failed,
}

impl std::fmt::Display for BundlePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Building => write!(f, "building"),
            Self::Submitting => write!(f, "submitting"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::PartiallyFailed => write!(f, "partially-failed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

pub struct BundleOrchestrator {
    submitter: Arc<dyn SubmitBundle>,
    history: Option<Arc<dyn HistorySink>>,
    in_flight: AtomicBool,
    phase: Mutex<BundlePhase>,
}

impl BundleOrchestrator {
    pub fn new(submitter: Arc<dyn SubmitBundle>) -> Self {
        Self {
            submitter,
            history: None,
            in_flight: AtomicBool::new(false),
            phase: Mutex::new(BundlePhase::Idle),
        }
    }

    /// Forward successfully landed business transactions to this sink.
    pub fn with_history(mut self, history: Arc<dyn HistorySink>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn phase(&self) -> BundlePhase {
        *self.phase.lock().expect("phase lock poisoned")
    }

    fn set_phase(&self, phase: BundlePhase) {
        *self.phase.lock().expect("phase lock poisoned") = phase;
    }

    /// Submit one bundle: the ordered items plus a trailing tip.
    ///
    /// Returns the full report, or an attempt-level error (pre-flight
    /// validation, atomic rejection, timeout). Rejects a second call
    /// while one submission is outstanding.
    #[instrument(skip_all, fields(items = items.len(), tip = tip_amount_sol))]
    pub async fn submit_bundle(
        &self,
        items: &[BundleItem],
        tip_amount_sol: f64,
    ) -> Result<BundleReport> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(BundleError::SubmissionInFlight);
        }

        let result = self.run(items, tip_amount_sol).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run(&self, items: &[BundleItem], tip_amount_sol: f64) -> Result<BundleReport> {
        self.set_phase(BundlePhase::Building);

        // Top-level validation, before any item is attempted.
        if items.is_empty() {
            self.set_phase(BundlePhase::Failed);
            return Err(BundleError::EmptyBundle);
        }
        if !(tip_amount_sol > 0.0) {
            self.set_phase(BundlePhase::Failed);
            return Err(BundleError::InvalidAmount(tip_amount_sol));
        }

        self.set_phase(BundlePhase::Submitting);

        match self.submitter.submit(items, tip_amount_sol).await {
            Ok(report) => {
                let outcome = report.outcome();
                self.set_phase(match outcome {
                    BundleOutcome::Confirmed => BundlePhase::Confirmed,
                    BundleOutcome::PartiallyFailed => BundlePhase::PartiallyFailed,
                    BundleOutcome::Failed => BundlePhase::Failed,
                });
                info!(
                    %outcome,
                    succeeded = report.succeeded(),
                    entries = report.results.len(),
                    total_time_ms = report.total_time_ms,
                    "bundle submission finished"
                );

                self.record_history(items, &report);
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "bundle submission aborted");
                self.set_phase(BundlePhase::Failed);
                Err(e)
            }
        }
    }

    /// One record per successfully landed business transaction.
    /// Failures and the tip entry are deliberately not recorded.
    fn record_history(&self, items: &[BundleItem], report: &BundleReport) {
        let Some(ref history) = self.history else {
            return;
        };
        for (item, result) in items.iter().zip(&report.results) {
            if result.success {
                history.record(TxRecord::confirmed_bundle_item(
                    result.signature.clone(),
                    item.amount_sol,
                    result.time_ms,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bundle::{BundleResult, TIP_LABEL};
    use crate::history::MemoryHistory;
    use crate::sequential::SequentialSubmitter;
    use crate::testing::{BlockedBroadcaster, FlakySigner, MockBroadcaster, MockSigner};
    use crate::tip::TipAccountPool;
    use crate::tx_factory::TxFactory;
    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;

    fn item(n: usize) -> BundleItem {
        BundleItem::new(
            n.to_string(),
            Pubkey::new_unique().to_string(),
            0.001,
            1_000,
            format!("Transfer #{n}"),
        )
    }

    fn sequential_orchestrator(
        signer: Arc<dyn crate::signer::TransactionSigner>,
        broadcaster: Arc<dyn crate::broadcast::Broadcaster>,
    ) -> BundleOrchestrator {
        let submitter = SequentialSubmitter::new(
            TxFactory::default(),
            TipAccountPool::mainnet(),
            signer,
            broadcaster,
        );
        BundleOrchestrator::new(Arc::new(submitter))
    }

    #[tokio::test]
    async fn confirmed_bundle_reaches_confirmed_phase() {
        let orchestrator = sequential_orchestrator(
            Arc::new(MockSigner::new()),
            Arc::new(MockBroadcaster::succeeding(Duration::ZERO)),
        );

        let report = orchestrator
            .submit_bundle(&[item(1), item(2)], 0.0001)
            .await
            .unwrap();
        assert_eq!(report.outcome(), BundleOutcome::Confirmed);
        assert_eq!(orchestrator.phase(), BundlePhase::Confirmed);
    }

    #[tokio::test]
    async fn partial_failure_is_partially_failed_not_failed() {
        let orchestrator = sequential_orchestrator(
            Arc::new(FlakySigner::failing_on(&[2])),
            Arc::new(MockBroadcaster::succeeding(Duration::ZERO)),
        );

        let report = orchestrator
            .submit_bundle(&[item(1), item(2), item(3)], 0.0001)
            .await
            .unwrap();
        assert_eq!(report.outcome(), BundleOutcome::PartiallyFailed);
        assert_eq!(orchestrator.phase(), BundlePhase::PartiallyFailed);
    }

    #[tokio::test]
    async fn empty_bundle_aborts_before_submission() {
        let orchestrator = sequential_orchestrator(
            Arc::new(MockSigner::new()),
            Arc::new(MockBroadcaster::succeeding(Duration::ZERO)),
        );

        let err = orchestrator.submit_bundle(&[], 0.0001).await.unwrap_err();
        assert!(matches!(err, BundleError::EmptyBundle));
        assert_eq!(orchestrator.phase(), BundlePhase::Failed);
    }

    #[tokio::test]
    async fn non_positive_tip_aborts() {
        let orchestrator = sequential_orchestrator(
            Arc::new(MockSigner::new()),
            Arc::new(MockBroadcaster::succeeding(Duration::ZERO)),
        );

        let err = orchestrator.submit_bundle(&[item(1)], 0.0).await.unwrap_err();
        assert!(matches!(err, BundleError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn second_concurrent_submission_is_rejected() {
        let broadcaster = Arc::new(BlockedBroadcaster::new());
        let orchestrator = Arc::new(sequential_orchestrator(
            Arc::new(MockSigner::new()),
            broadcaster.clone(),
        ));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit_bundle(&[item(1)], 0.0001).await })
        };

        // Let the first submission park on the blocked blockhash fetch.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = orchestrator
            .submit_bundle(&[item(2)], 0.0001)
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::SubmissionInFlight));

        broadcaster.release();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.results.len(), 2);

        // The gate reopens once the first attempt finishes.
        orchestrator.submit_bundle(&[item(3)], 0.0001).await.unwrap();
    }

    #[tokio::test]
    async fn history_gets_successful_business_items_only() {
        let history = Arc::new(MemoryHistory::new());
        let submitter = SequentialSubmitter::new(
            TxFactory::default(),
            TipAccountPool::mainnet(),
            Arc::new(FlakySigner::failing_on(&[2])),
            Arc::new(MockBroadcaster::succeeding(Duration::ZERO)),
        );
        let orchestrator =
            BundleOrchestrator::new(Arc::new(submitter)).with_history(history.clone());

        let items = vec![item(1), item(2), item(3)];
        orchestrator.submit_bundle(&items, 0.0001).await.unwrap();

        // Items 1 and 3 landed; item 2 failed and the tip is never recorded.
        let records = history.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.amount_sol == 0.001));
    }

    #[tokio::test]
    async fn attempt_level_error_sets_failed_phase() {
        struct RejectingSubmitter;

        #[async_trait]
        impl SubmitBundle for RejectingSubmitter {
            async fn submit(&self, _: &[BundleItem], _: f64) -> crate::error::Result<BundleReport> {
                Err(BundleError::BundleRejected("tip too low".into()))
            }
        }

        let orchestrator = BundleOrchestrator::new(Arc::new(RejectingSubmitter));
        let err = orchestrator.submit_bundle(&[item(1)], 0.0001).await.unwrap_err();
        assert!(matches!(err, BundleError::BundleRejected(_)));
        assert_eq!(orchestrator.phase(), BundlePhase::Failed);
    }

    #[tokio::test]
    async fn report_entries_stay_aligned_with_items_for_history() {
        // Guard against the tip entry ever being zipped against an item.
        struct FixedSubmitter;

        #[async_trait]
        impl SubmitBundle for FixedSubmitter {
            async fn submit(
                &self,
                items: &[BundleItem],
                _: f64,
            ) -> crate::error::Result<BundleReport> {
                let mut results: Vec<BundleResult> = items
                    .iter()
                    .map(|i| BundleResult::ok(&i.label, format!("sig-{}", i.id), 10))
                    .collect();
                results.push(BundleResult::ok(TIP_LABEL, "sig-tip", 10));
                Ok(BundleReport::from_sequential(results))
            }
        }

        let history = Arc::new(MemoryHistory::new());
        let orchestrator =
            BundleOrchestrator::new(Arc::new(FixedSubmitter)).with_history(history.clone());

        orchestrator
            .submit_bundle(&[item(1), item(2)], 0.0001)
            .await
            .unwrap();

        let records = history.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.signature != "sig-tip"));
    }
}
