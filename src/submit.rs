/// The bundle-submission capability.
///
/// "Submit a bundle" is one interface with two implementations: the
/// atomic block-engine path and the sequential fallback. The orchestrator
/// picks one at configuration time; transaction construction is shared
/// underneath ([`crate::tx_factory`], [`crate::tip`]).
use async_trait::async_trait;

use crate::bundle::{BundleItem, BundleReport};
use crate::error::Result;

#[async_trait]
pub trait SubmitBundle: Send + Sync {
    /// Submit the ordered items plus one trailing tip transaction.
    ///
    /// On success the report has `items.len() + 1` entries in input
    /// order, tip last. An `Err` means the whole attempt failed before
    /// or without per-item granularity (atomic rejection/timeout, or a
    /// pre-flight abort).
    async fn submit(&self, items: &[BundleItem], tip_amount_sol: f64) -> Result<BundleReport>;
}
