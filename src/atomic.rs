/// Atomic bundle submission through a block-engine.
///
/// All business transactions are built and signed against one common
/// blockhash so they are mutually consistent and eligible for same-slot
/// inclusion; the tip transaction is appended as the **last** element —
/// the protocol convention the block-engine uses to identify the bundle.
/// Either the whole bundle lands, in order, within a single slot, or
/// none of it does.
///
/// There is no per-item granularity on this path: a signing rejection,
/// an explicit bundle rejection, or 30 s of silence each fail the whole
/// attempt. Timeout is reported as its own failure kind, distinct from
/// rejection.
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, transaction::Transaction};
use tracing::{debug, info, instrument};

use crate::block_engine::{BlockEngine, BlockEngineOutcome};
use crate::broadcast::Broadcaster;
use crate::bundle::{BundleItem, BundleReport, BundleResult, TIP_LABEL};
use crate::error::{BundleError, Result};
use crate::signer::TransactionSigner;
use crate::submit::SubmitBundle;
use crate::tip::TipAccountPool;
use crate::tx_factory::TxFactory;

/// The block-engine accepts at most 5 transactions per bundle,
/// tip included.
pub const MAX_BUNDLE_SIZE: usize = 5;

/// Wait budget for the bundle outcome before reporting a timeout.
pub const DEFAULT_RESULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AtomicSubmitter {
    factory: TxFactory,
    tips: TipAccountPool,
    signer: Arc<dyn TransactionSigner>,
    broadcaster: Arc<dyn Broadcaster>,
    engine: Arc<dyn BlockEngine>,
    result_timeout: Duration,
}

impl AtomicSubmitter {
    pub fn new(
        factory: TxFactory,
        tips: TipAccountPool,
        signer: Arc<dyn TransactionSigner>,
        broadcaster: Arc<dyn Broadcaster>,
        engine: Arc<dyn BlockEngine>,
    ) -> Self {
        Self {
            factory,
            tips,
            signer,
            broadcaster,
            engine,
            result_timeout: DEFAULT_RESULT_TIMEOUT,
        }
    }

    pub fn with_result_timeout(mut self, result_timeout: Duration) -> Self {
        self.result_timeout = result_timeout;
        self
    }

    /// Build and sign every transaction against the shared blockhash.
    /// Any failure here aborts the attempt — partial signing is useless
    /// since the bundle must be submitted whole.
    async fn build_signed_bundle(
        &self,
        items: &[BundleItem],
        tip_amount_sol: f64,
    ) -> Result<Vec<Transaction>> {
        let blockhash = self.broadcaster.latest_blockhash().await?;
        debug!(%blockhash, "shared bundle blockhash");

        let sender = self.signer.pubkey();
        let mut transactions = Vec::with_capacity(items.len() + 1);

        for item in items {
            let recipient = Pubkey::from_str(&item.recipient)
                .map_err(|e| BundleError::InvalidRecipient(format!("{}: {e}", item.recipient)))?;
            if !(item.amount_sol > 0.0) {
                return Err(BundleError::InvalidAmount(item.amount_sol));
            }

            let mut tx =
                self.factory
                    .build_transfer(&sender, &recipient, item.amount_sol, item.priority_fee);
            tx.message.recent_blockhash = blockhash;
            transactions.push(self.signer.sign_transaction(tx).await?);
        }

        let tip_account = self.tips.pick();
        let mut tip_tx = self.factory.build_tip(&sender, &tip_account, tip_amount_sol);
        tip_tx.message.recent_blockhash = blockhash;
        transactions.push(self.signer.sign_transaction(tip_tx).await?);

        Ok(transactions)
    }
}

#[async_trait]
impl SubmitBundle for AtomicSubmitter {
    #[instrument(skip_all, fields(items = items.len(), tip = tip_amount_sol))]
    async fn submit(&self, items: &[BundleItem], tip_amount_sol: f64) -> Result<BundleReport> {
        if items.is_empty() {
            return Err(BundleError::EmptyBundle);
        }
        if items.len() + 1 > MAX_BUNDLE_SIZE {
            return Err(BundleError::BundleTooLarge {
                count: items.len() + 1,
                max: MAX_BUNDLE_SIZE,
            });
        }

        let start = Instant::now();
        let transactions = self.build_signed_bundle(items, tip_amount_sol).await?;

        let bundle_id = self.engine.send_bundle(&transactions).await?;

        // Acceptance is not inclusion: await the auction outcome, bounded.
        let outcome = tokio::time::timeout(
            self.result_timeout,
            self.engine.await_bundle_result(&bundle_id),
        )
        .await
        .map_err(|_| BundleError::BundleTimeout(self.result_timeout))??;

        match outcome {
            BlockEngineOutcome::Landed { slot } => {
                let total_time_ms = start.elapsed().as_millis() as u64;
                info!(bundle_id = %bundle_id, slot, total_time_ms, "bundle landed atomically");

                // One wall-clock measurement covers the whole bundle; it is
                // stamped on each entry and recorded once as the total.
                let results = items
                    .iter()
                    .map(|item| item.label.as_str())
                    .chain(std::iter::once(TIP_LABEL))
                    .zip(&transactions)
                    .map(|(label, tx)| {
                        let signature = tx
                            .signatures
                            .first()
                            .map(|s| s.to_string())
                            .unwrap_or_default();
                        BundleResult::ok(label, signature, total_time_ms)
                    })
                    .collect();

                Ok(BundleReport::with_total(results, total_time_ms))
            }
            BlockEngineOutcome::Rejected { reason } => Err(BundleError::BundleRejected(reason)),
        }
    }
}
