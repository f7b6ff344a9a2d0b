/// Signing capability.
///
/// Submitters never see a private key — they hold a signing capability,
/// matching how browser wallets work. A wallet adapter, a remote signer,
/// or a local [`Keypair`] all fit behind the same trait.
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer as _,
    transaction::Transaction,
};

use crate::error::{BundleError, Result};

/// Something that can approve transactions on behalf of a sender.
///
/// May reject (user cancellation, locked wallet); rejection surfaces as
/// [`BundleError::SigningRejected`].
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The sender / fee-payer public key.
    fn pubkey(&self) -> Pubkey;

    /// Sign the transaction. The recent blockhash must already be stamped
    /// on the message.
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;
}

/// Local keypair signer, used by the script path and in tests.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
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

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, pubkey::Pubkey, system_instruction};

    #[tokio::test]
    async fn keypair_signer_signs() {
        let keypair = Keypair::new();
        let signer = KeypairSigner::new(keypair);

        let ix = system_instruction::transfer(&signer.pubkey(), &Pubkey::new_unique(), 1_000);
        let mut tx = Transaction::new_with_payer(&[ix], Some(&signer.pubkey()));
        tx.message.recent_blockhash = Hash::new_unique();

        let signed = signer.sign_transaction(tx).await.unwrap();
        assert!(signed.is_signed());
    }

    #[tokio::test]
    async fn signing_fails_for_foreign_payer() {
        let signer = KeypairSigner::new(Keypair::new());
        let stranger = Pubkey::new_unique();

        let ix = system_instruction::transfer(&stranger, &Pubkey::new_unique(), 1_000);
        let mut tx = Transaction::new_with_payer(&[ix], Some(&stranger));
        tx.message.recent_blockhash = Hash::new_unique();

        let result = signer.sign_transaction(tx).await;
        assert!(matches!(result, Err(BundleError::SigningRejected(_))));
    }
}
