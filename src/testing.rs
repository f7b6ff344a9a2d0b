//! Mock collaborators shared by the unit tests.
#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Keypair, signature::Signature,
    signer::Signer as _, transaction::Transaction,
};
use tokio::sync::Semaphore;

use crate::block_engine::{BlockEngine, BlockEngineOutcome};
use crate::broadcast::Broadcaster;
use crate::error::{BundleError, Result};
use crate::signer::TransactionSigner;

// ─── Signers ────────────────────────────────────────────────────────────────

/// Signer that approves everything.
pub struct MockSigner {
    keypair: Keypair,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| BundleError::SigningRejected(e.to_string()))?;
        Ok(tx)
    }
}

/// Signer that rejects specific calls (1-based call index).
pub struct FlakySigner {
    inner: MockSigner,
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl FlakySigner {
    pub fn failing_on(fail_on: &[usize]) -> Self {
        Self {
            inner: MockSigner::new(),
            fail_on: fail_on.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TransactionSigner for FlakySigner {
    fn pubkey(&self) -> Pubkey {
        self.inner.pubkey()
    }

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&call) {
            return Err(BundleError::SigningRejected("user declined".into()));
        }
        self.inner.sign_transaction(tx).await
    }
}

// ─── Broadcasters ───────────────────────────────────────────────────────────

/// Broadcaster with a fixed per-confirmation latency, always succeeding,
/// or failing every broadcast. Counts calls for assertions.
pub struct MockBroadcaster {
    confirm_delay: Duration,
    fail_broadcast: bool,
    blockhash_fetches: AtomicUsize,
    sent: AtomicUsize,
}

impl MockBroadcaster {
    pub fn succeeding(confirm_delay: Duration) -> Self {
        Self {
            confirm_delay,
            fail_broadcast: false,
            blockhash_fetches: AtomicUsize::new(0),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn failing_broadcast() -> Self {
        Self {
            confirm_delay: Duration::ZERO,
            fail_broadcast: true,
            blockhash_fetches: AtomicUsize::new(0),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn blockhash_fetches(&self) -> usize {
        self.blockhash_fetches.load(Ordering::SeqCst)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broadcaster for MockBroadcaster {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.blockhash_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_unique())
    }

    async fn send_transaction(&self, _tx: &Transaction) -> Result<Signature> {
        if self.fail_broadcast {
            return Err(BundleError::Broadcast("insufficient funds".into()));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(Signature::new_unique())
    }

    async fn confirm_transaction(&self, _signature: &Signature) -> Result<()> {
        if !self.confirm_delay.is_zero() {
            tokio::time::sleep(self.confirm_delay).await;
        }
        Ok(())
    }
}

/// Broadcaster whose blockhash fetch parks until released — used to hold
/// a submission in flight.
pub struct BlockedBroadcaster {
    gate: Semaphore,
    inner: MockBroadcaster,
}

impl BlockedBroadcaster {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            inner: MockBroadcaster::succeeding(Duration::ZERO),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl Broadcaster for BlockedBroadcaster {
    async fn latest_blockhash(&self) -> Result<Hash> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| BundleError::BlockhashFetch(e.to_string()))?;
        self.inner.latest_blockhash().await
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature> {
        self.inner.send_transaction(tx).await
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<()> {
        self.inner.confirm_transaction(signature).await
    }
}

// ─── Block engine ───────────────────────────────────────────────────────────

enum EngineBehavior {
    Land { slot: u64 },
    Reject { reason: String },
    Silent,
}

/// Block engine with a scripted outcome.
pub struct MockBlockEngine {
    behavior: EngineBehavior,
    sends: AtomicUsize,
    last_bundle_size: Mutex<usize>,
}

impl MockBlockEngine {
    pub fn landing_in_slot(slot: u64) -> Self {
        Self::with_behavior(EngineBehavior::Land { slot })
    }

    pub fn rejecting(reason: &str) -> Self {
        Self::with_behavior(EngineBehavior::Reject {
            reason: reason.to_string(),
        })
    }

    /// Never produces an outcome — the caller's timeout must fire.
    pub fn silent() -> Self {
        Self::with_behavior(EngineBehavior::Silent)
    }

    fn with_behavior(behavior: EngineBehavior) -> Self {
        Self {
            behavior,
            sends: AtomicUsize::new(0),
            last_bundle_size: Mutex::new(0),
        }
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn last_bundle_size(&self) -> usize {
        *self.last_bundle_size.lock().unwrap()
    }
}

#[async_trait]
impl BlockEngine for MockBlockEngine {
    async fn send_bundle(&self, transactions: &[Transaction]) -> Result<String> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        *self.last_bundle_size.lock().unwrap() = transactions.len();
        Ok("bundle-mock-1".into())
    }

    async fn await_bundle_result(&self, _bundle_id: &str) -> Result<BlockEngineOutcome> {
        match &self.behavior {
            EngineBehavior::Land { slot } => Ok(BlockEngineOutcome::Landed { slot: *slot }),
            EngineBehavior::Reject { reason } => Ok(BlockEngineOutcome::Rejected {
                reason: reason.clone(),
            }),
            EngineBehavior::Silent => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
