/// Broadcast / confirmation collaborator.
///
/// The submitters talk to the cluster through this narrow trait:
/// blockhash fetch, broadcast, confirmation wait. [`RpcBroadcaster`]
/// implements it over the nonblocking Solana RPC client with bounded
/// confirmation polling at "confirmed" commitment.
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use tracing::debug;

use crate::error::{BundleError, Result};

#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Fetch a fresh blockhash. Fetched immediately before each
    /// transaction on the sequential path; shared across the bundle on
    /// the atomic path.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Broadcast a signed transaction, returning its signature.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature>;

    /// Wait until the transaction is confirmed, or fail.
    async fn confirm_transaction(&self, signature: &Signature) -> Result<()>;
}

/// Broadcaster backed by a Solana JSON-RPC node.
pub struct RpcBroadcaster {
    rpc: RpcClient,
    commitment: CommitmentConfig,
    max_confirm_polls: u32,
    poll_interval: Duration,
}

impl RpcBroadcaster {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc: RpcClient::new(rpc_url.to_string()),
            commitment: CommitmentConfig::confirmed(),
            max_confirm_polls: 30,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_confirm_polling(mut self, max_polls: u32, poll_interval: Duration) -> Self {
        self.max_confirm_polls = max_polls;
        self.poll_interval = poll_interval;
        self
    }

    pub fn rpc_client(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl Broadcaster for RpcBroadcaster {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| BundleError::BlockhashFetch(e.to_string()))
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature> {
        self.rpc
            .send_transaction(tx)
            .await
            .map_err(|e| BundleError::Broadcast(e.to_string()))
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<()> {
        for attempt in 1..=self.max_confirm_polls {
            let confirmed = self
                .rpc
                .confirm_transaction_with_commitment(signature, self.commitment)
                .await
                .map_err(|e| BundleError::Confirmation(e.to_string()))?;

            if confirmed.value {
                debug!(%signature, attempt, "transaction confirmed");
                return Ok(());
            }

            if attempt < self.max_confirm_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(BundleError::Confirmation(format!(
            "{signature} not confirmed after {} polls",
            self.max_confirm_polls
        )))
    }
}
