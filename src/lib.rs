//! Solana bundle construction and submission.
//!
//! Builds an ordered set of fee-prioritized transfers plus one trailing
//! validator tip, and submits it over one of two paths behind a single
//! interface:
//!
//! - **Atomic** ([`atomic::AtomicSubmitter`]): the whole bundle goes to a
//!   block-engine as one unit and lands in a single slot in order, or not
//!   at all.
//! - **Sequential** ([`sequential::SequentialSubmitter`]): each transaction
//!   is broadcast and confirmed on its own — the fallback where no
//!   block-engine exists (devnet). Same construction logic, no atomicity.
//!
//! [`orchestrator::BundleOrchestrator`] drives one attempt at a time and
//! aggregates per-entry outcomes into a [`bundle::BundleReport`].

pub mod atomic;
pub mod block_engine;
pub mod broadcast;
pub mod bundle;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod sequential;
pub mod signer;
pub mod submit;
pub mod tip;
pub mod tx_factory;

#[cfg(test)]
mod testing;

pub use atomic::AtomicSubmitter;
pub use block_engine::{BlockEngine, BlockEngineOutcome, HttpBlockEngine};
pub use broadcast::{Broadcaster, RpcBroadcaster};
pub use bundle::{BundleItem, BundleOutcome, BundleReport, BundleResult, TIP_LABEL};
pub use error::{BundleError, Result};
pub use history::{HistorySink, MemoryHistory, TxRecord};
pub use orchestrator::{BundleOrchestrator, BundlePhase};
pub use sequential::SequentialSubmitter;
pub use signer::{KeypairSigner, TransactionSigner};
pub use submit::SubmitBundle;
pub use tip::TipAccountPool;
pub use tx_factory::{lamports_from_sol, TxFactory, DEFAULT_COMPUTE_UNIT_LIMIT};
