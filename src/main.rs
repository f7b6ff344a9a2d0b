/// Bundle submission demo — binary entry-point.
///
/// Reproduces the console's bundle flow end to end: three prioritized
/// transfers plus a 0.0001 SOL tip, submitted atomically through a
/// block-engine on mainnet, or sequentially everywhere else (no
/// block-engine exists on devnet — the construction logic is identical,
/// only the transport differs).
///
/// # Usage
/// ```bash
/// # Devnet sequential fallback (default):
/// cargo run
///
/// # Mainnet atomic bundle:
/// SOLANA_CLUSTER=mainnet-beta \
/// RPC_URL=https://api.mainnet-beta.solana.com \
/// BLOCK_ENGINE_URL=https://mainnet.block-engine.jito.wtf/api/v1/bundles \
/// cargo run
/// ```
use std::env;
use std::sync::Arc;

use anyhow::Result;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use tracing::{error, info, warn};

use soltx_bundler::{
    block_engine, AtomicSubmitter, BundleItem, BundleOrchestrator, HttpBlockEngine, KeypairSigner,
    MemoryHistory, RpcBroadcaster, SequentialSubmitter, SubmitBundle, TipAccountPool, TxFactory,
};

/// Validator tip (0.0001 SOL — adjust for network conditions).
const TIP_AMOUNT_SOL: f64 = 0.0001;

/// Per-transfer amount.
const TRANSFER_AMOUNT_SOL: f64 = 0.001;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,soltx_bundler=debug")
        .init();

    let cluster = env::var("SOLANA_CLUSTER").unwrap_or_else(|_| "devnet".to_string());
    let is_mainnet = cluster == "mainnet-beta";
    let rpc_url = env::var("RPC_URL")
        .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string());

    info!(cluster, rpc = %rpc_url, atomic = is_mainnet, "=== SolTx bundle demo ===");

    // In production: load from file or HSM
    //   let payer = solana_sdk::signature::read_keypair_file("~/.config/solana/id.json")?;
    let payer = Keypair::new();
    info!(pubkey = %payer.pubkey(), "wallet loaded (ephemeral keypair)");

    let factory = TxFactory::default();
    let tips = TipAccountPool::mainnet();
    let signer = Arc::new(KeypairSigner::new(payer));
    let broadcaster = Arc::new(RpcBroadcaster::new(&rpc_url));

    let submitter: Arc<dyn SubmitBundle> = if is_mainnet {
        let engine_url = env::var("BLOCK_ENGINE_URL")
            .unwrap_or_else(|_| block_engine::endpoints::MAINNET.to_string());
        info!(engine = %engine_url, "atomic path: block-engine bundle");
        Arc::new(AtomicSubmitter::new(
            factory,
            tips,
            signer,
            broadcaster,
            Arc::new(HttpBlockEngine::new(&engine_url)),
        ))
    } else {
        warn!("no block-engine on {cluster} — sequential fallback, not atomic");
        Arc::new(SequentialSubmitter::new(factory, tips, signer, broadcaster))
    };

    let history = Arc::new(MemoryHistory::new());
    let orchestrator = BundleOrchestrator::new(submitter).with_history(history.clone());

    // Three ordered transfers with descending priority fees.
    let items = vec![
        BundleItem::new("1", Pubkey::new_unique().to_string(), TRANSFER_AMOUNT_SOL, 5_000, "Transfer #1"),
        BundleItem::new("2", Pubkey::new_unique().to_string(), TRANSFER_AMOUNT_SOL, 3_000, "Transfer #2"),
        BundleItem::new("3", Pubkey::new_unique().to_string(), TRANSFER_AMOUNT_SOL, 1_000, "Transfer #3"),
    ];

    info!(items = items.len(), tip = TIP_AMOUNT_SOL, "submitting bundle");

    match orchestrator.submit_bundle(&items, TIP_AMOUNT_SOL).await {
        Ok(report) => {
            info!(
                outcome = %report.outcome(),
                succeeded = report.succeeded(),
                entries = report.results.len(),
                total_time_ms = report.total_time_ms,
                "bundle finished"
            );
            for (i, r) in report.results.iter().enumerate() {
                if r.success {
                    info!("  [{i}] ✓ {} {}ms {}", r.label, r.time_ms, r.signature);
                } else {
                    warn!(
                        "  [{i}] ✗ {} {}ms {}",
                        r.label,
                        r.time_ms,
                        r.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            info!(
                recorded = history.len(),
                avg_confirm_ms = history.avg_confirm_ms(),
                "history updated"
            );
        }
        Err(e) => {
            // Expected when running without a funded wallet or network.
            error!(error = %e, "bundle submission failed");
        }
    }

    Ok(())
}
