/// Block-engine client for atomic bundle submission.
///
/// The block-engine accepts an ordered set of signed transactions as one
/// unit and either includes them all, in order, within a single slot, or
/// none of them. Acceptance (`sendBundle` returning an id) is not an
/// inclusion guarantee — the bundle may still be dropped if the tip loses
/// the auction, so the outcome is polled separately.
///
/// [`HttpBlockEngine`] speaks the JSON-RPC surface (`sendBundle`,
/// `getInflightBundleStatuses`); transactions travel bincode-serialized
/// and base64-encoded. The push-style result notification is flattened
/// into [`BlockEngine::await_bundle_result`], a single awaitable the
/// caller bounds with a timeout.
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, instrument, warn};

use crate::error::{BundleError, Result};

/// Well-known block-engine API endpoints (mainnet regions).
pub mod endpoints {
    pub const MAINNET: &str = "https://mainnet.block-engine.jito.wtf/api/v1/bundles";
    pub const AMSTERDAM: &str = "https://amsterdam.mainnet.block-engine.jito.wtf/api/v1/bundles";
    pub const FRANKFURT: &str = "https://frankfurt.mainnet.block-engine.jito.wtf/api/v1/bundles";
    pub const NY: &str = "https://ny.mainnet.block-engine.jito.wtf/api/v1/bundles";
    pub const TOKYO: &str = "https://tokyo.mainnet.block-engine.jito.wtf/api/v1/bundles";
}

/// Terminal outcome of a submitted bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockEngineOutcome {
    /// Included on-chain; all transactions landed in this slot.
    Landed { slot: u64 },
    /// Dropped or failed simulation; never partially included.
    Rejected { reason: String },
}

/// In-flight status reported while a bundle is still being auctioned.
#[derive(Clone, Debug, PartialEq, Eq)]
enum InFlightStatus {
    Pending,
    Landed { slot: u64 },
    Failed,
    Unknown(String),
}

/// The atomic submission collaborator.
#[async_trait]
pub trait BlockEngine: Send + Sync {
    /// Submit signed transactions as one atomic bundle.
    /// Returns the bundle identifier used for result polling.
    async fn send_bundle(&self, transactions: &[Transaction]) -> Result<String>;

    /// Await the terminal outcome of a previously submitted bundle.
    /// Polls until the bundle lands or is rejected; the caller is
    /// responsible for bounding the wait with a timeout.
    async fn await_bundle_result(&self, bundle_id: &str) -> Result<BlockEngineOutcome>;
}

/// JSON-RPC block-engine client.
pub struct HttpBlockEngine {
    http: reqwest::Client,
    url: String,
    poll_interval: Duration,
}

impl HttpBlockEngine {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            poll_interval: Duration::from_secs(2),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(endpoints::MAINNET)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BundleError::Rpc(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| BundleError::Rpc(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = response.get("error") {
            return Err(BundleError::Rpc(format!("{method}: {err}")));
        }
        Ok(response)
    }

    fn parse_in_flight_status(response: &Value) -> InFlightStatus {
        let entry = response
            .get("result")
            .and_then(|r| r.get("value"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first());

        let status = entry
            .and_then(|e| e.get("status"))
            .and_then(|s| s.as_str());

        match status {
            Some("Landed") => {
                let slot = entry
                    .and_then(|e| e.get("landed_slot"))
                    .and_then(|s| s.as_u64())
                    .unwrap_or_default();
                InFlightStatus::Landed { slot }
            }
            Some("Pending") => InFlightStatus::Pending,
            Some("Failed") | Some("Invalid") => InFlightStatus::Failed,
            Some(other) => InFlightStatus::Unknown(other.to_string()),
            // The block-engine has no record yet — treat as pending.
            None => InFlightStatus::Pending,
        }
    }
}

#[async_trait]
impl BlockEngine for HttpBlockEngine {
    #[instrument(skip_all, fields(bundle_size = transactions.len()))]
    async fn send_bundle(&self, transactions: &[Transaction]) -> Result<String> {
        let encoded: Vec<Value> = transactions
            .iter()
            .map(|tx| {
                let bytes = bincode::serialize(tx)
                    .map_err(|e| BundleError::Serialization(e.to_string()))?;
                Ok(Value::String(general_purpose::STANDARD.encode(bytes)))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(bundle_size = transactions.len(), "submitting atomic bundle");

        let params = json!([encoded, { "encoding": "base64" }]);
        let response = self.rpc_call("sendBundle", params).await?;

        let bundle_id = response["result"]
            .as_str()
            .ok_or_else(|| {
                BundleError::BundleRejected("missing 'result' (bundle id) in response".into())
            })?
            .to_string();

        info!(bundle_id = %bundle_id, "bundle accepted by block-engine");
        Ok(bundle_id)
    }

    #[instrument(skip_all, fields(bundle_id = %bundle_id))]
    async fn await_bundle_result(&self, bundle_id: &str) -> Result<BlockEngineOutcome> {
        loop {
            let params = json!([[bundle_id]]);
            let response = self
                .rpc_call("getInflightBundleStatuses", params)
                .await?;

            match Self::parse_in_flight_status(&response) {
                InFlightStatus::Landed { slot } => {
                    info!(bundle_id, slot, "bundle landed");
                    return Ok(BlockEngineOutcome::Landed { slot });
                }
                InFlightStatus::Failed => {
                    return Ok(BlockEngineOutcome::Rejected {
                        reason: "block-engine reported bundle Failed".into(),
                    });
                }
                InFlightStatus::Pending => {
                    debug!(bundle_id, "bundle still in flight");
                }
                InFlightStatus::Unknown(ref s) => {
                    warn!(bundle_id, status = %s, "unexpected in-flight status");
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
