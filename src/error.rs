use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("invalid amount: {0} SOL (must be positive)")]
    InvalidAmount(f64),

    #[error("signing rejected: {0}")]
    SigningRejected(String),

    #[error("blockhash fetch failed: {0}")]
    BlockhashFetch(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("bundle rejected by block-engine: {0}")]
    BundleRejected(String),

    #[error("no bundle result within {0:?} — may have been dropped (tip too low?)")]
    BundleTimeout(Duration),

    #[error("bundle too large: {count} transactions (maximum: {max})")]
    BundleTooLarge { count: usize, max: usize },

    #[error("bundle contains no transactions")]
    EmptyBundle,

    #[error("a bundle submission is already in flight")]
    SubmissionInFlight,

    #[error("no tip accounts configured")]
    NoTipAccounts,

    #[error("block-engine RPC error: {0}")]
    Rpc(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, BundleError>;
