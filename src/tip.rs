/// Tip-account selection.
///
/// Tips are plain SOL transfers to one of a fixed pool of well-known
/// tip accounts. Picking uniformly at random spreads tip revenue across
/// validators and keeps any single tip account from becoming a
/// predictable target. Every pick is independent — repeats are fine.
use std::str::FromStr;

use rand::seq::SliceRandom;
use solana_sdk::pubkey::Pubkey;

use crate::error::{BundleError, Result};

/// The eight well-known mainnet tip accounts.
/// Source: <https://jito-labs.gitbook.io/mev/searcher-resources/tip-accounts>
const MAINNET_TIP_ACCOUNTS: [&str; 8] = [
    "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5",
    "HFqU5x63VTqvQss8hp11i4bVqkfRtQ7NmXwkiY8qHb2G",
    "Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY",
    "ADaUMid9yfUytqMBgopwjb2DTLSLjT5SKoLUfEpAQdgt",
    "DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh",
    "ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt",
    "DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL",
    "3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT",
];

/// A fixed pool of tip-recipient accounts. Stateless: construction aside,
/// every call draws independently.
#[derive(Clone, Debug)]
pub struct TipAccountPool {
    accounts: Vec<Pubkey>,
}

impl TipAccountPool {
    /// Build a pool from explicit accounts.
    pub fn new(accounts: Vec<Pubkey>) -> Result<Self> {
        if accounts.is_empty() {
            return Err(BundleError::NoTipAccounts);
        }
        Ok(Self { accounts })
    }

    /// The well-known mainnet pool.
    pub fn mainnet() -> Self {
        let accounts = MAINNET_TIP_ACCOUNTS
            .iter()
            .map(|s| Pubkey::from_str(s).expect("hardcoded tip account pubkey must be valid"))
            .collect();
        Self { accounts }
    }

    /// Pick a tip account uniformly at random.
    pub fn pick(&self) -> Pubkey {
        *self
            .accounts
            .choose(&mut rand::thread_rng())
            .expect("pool is never empty by construction")
    }

    pub fn accounts(&self) -> &[Pubkey] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for TipAccountPool {
    fn default() -> Self {
        Self::mainnet()
    }
}
