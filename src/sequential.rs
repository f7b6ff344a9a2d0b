/// Sequential fallback submission.
///
/// Used where no block-engine exists (devnet, test clusters). Each
/// transaction is submitted and confirmed on its own, in input order,
/// so there is **no** cross-transaction inclusion guarantee — each entry
/// lands or fails independently. The construction logic (tip placement,
/// ordering, compute budget) is identical to the atomic path; only the
/// transport differs.
///
/// Each item gets its own freshly fetched blockhash: entries are not
/// guaranteed to execute within one shared validity window here, unlike
/// the atomic path which deliberately shares one blockhash.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tracing::{info, instrument, warn};

use crate::broadcast::Broadcaster;
use crate::bundle::{BundleItem, BundleReport, BundleResult, TIP_LABEL};
use crate::error::{BundleError, Result};
use crate::signer::TransactionSigner;
use crate::submit::SubmitBundle;
use crate::tip::TipAccountPool;
use crate::tx_factory::TxFactory;

pub struct SequentialSubmitter {
    factory: TxFactory,
    tips: TipAccountPool,
    signer: Arc<dyn TransactionSigner>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl SequentialSubmitter {
    pub fn new(
        factory: TxFactory,
        tips: TipAccountPool,
        signer: Arc<dyn TransactionSigner>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            factory,
            tips,
            signer,
            broadcaster,
        }
    }

    /// Build → stamp blockhash → sign → broadcast → confirm, for one item.
    async fn submit_item(&self, item: &BundleItem) -> Result<Signature> {
        let recipient = Pubkey::from_str(&item.recipient)
            .map_err(|e| BundleError::InvalidRecipient(format!("{}: {e}", item.recipient)))?;
        if !(item.amount_sol > 0.0) {
            return Err(BundleError::InvalidAmount(item.amount_sol));
        }

        let mut tx = self.factory.build_transfer(
            &self.signer.pubkey(),
            &recipient,
            item.amount_sol,
            item.priority_fee,
        );
        tx.message.recent_blockhash = self.broadcaster.latest_blockhash().await?;

        let signed = self.signer.sign_transaction(tx).await?;
        let signature = self.broadcaster.send_transaction(&signed).await?;
        self.broadcaster.confirm_transaction(&signature).await?;
        Ok(signature)
    }

    /// Same pattern for the trailing tip transaction.
    async fn submit_tip(&self, tip_amount_sol: f64) -> Result<Signature> {
        let tip_account = self.tips.pick();
        let mut tx = self
            .factory
            .build_tip(&self.signer.pubkey(), &tip_account, tip_amount_sol);
        tx.message.recent_blockhash = self.broadcaster.latest_blockhash().await?;

        let signed = self.signer.sign_transaction(tx).await?;
        let signature = self.broadcaster.send_transaction(&signed).await?;
        self.broadcaster.confirm_transaction(&signature).await?;
        Ok(signature)
    }
}

#[async_trait]
impl SubmitBundle for SequentialSubmitter {
    #[instrument(skip_all, fields(items = items.len(), tip = tip_amount_sol))]
    async fn submit(&self, items: &[BundleItem], tip_amount_sol: f64) -> Result<BundleReport> {
        let mut results: Vec<BundleResult> = Vec::with_capacity(items.len() + 1);

        // Strict input order; one item's failure never aborts the loop.
        for item in items {
            let start = Instant::now();
            match self.submit_item(item).await {
                Ok(signature) => {
                    let time_ms = start.elapsed().as_millis() as u64;
                    info!(label = %item.label, %signature, time_ms, "bundle item confirmed");
                    results.push(BundleResult::ok(&item.label, signature.to_string(), time_ms));
                }
                Err(e) => {
                    let time_ms = start.elapsed().as_millis() as u64;
                    warn!(label = %item.label, error = %e, time_ms, "bundle item failed");
                    results.push(BundleResult::failed(&item.label, time_ms, e));
                }
            }
        }

        // The tip is attempted unconditionally, even if every item failed.
        let start = Instant::now();
        match self.submit_tip(tip_amount_sol).await {
            Ok(signature) => {
                let time_ms = start.elapsed().as_millis() as u64;
                info!(%signature, time_ms, "tip confirmed");
                results.push(BundleResult::ok(TIP_LABEL, signature.to_string(), time_ms));
            }
            Err(e) => {
                let time_ms = start.elapsed().as_millis() as u64;
                warn!(error = %e, time_ms, "tip failed");
                results.push(BundleResult::failed(TIP_LABEL, time_ms, e));
            }
        }

        Ok(BundleReport::from_sequential(results))
    }
}
