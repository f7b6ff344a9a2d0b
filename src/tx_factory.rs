/// Transfer and tip transaction construction.
///
/// Every business transaction carries its own compute budget: when a
/// priority fee is set, the compute-unit-price and compute-unit-limit
/// instructions must come **before** the transfer — the runtime requires
/// compute-budget instructions to precede the instructions they apply to.
/// Tip transactions are a bare transfer with no compute-budget
/// instructions, so they stay cheap regardless of the business
/// transactions' priority settings.
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, instruction::Instruction,
    native_token::LAMPORTS_PER_SOL, pubkey::Pubkey, system_instruction, transaction::Transaction,
};

/// Static compute-unit limit attached alongside a priority fee.
/// Not derived from the instruction set's actual cost.
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 200_000;

/// Convert a SOL amount to lamports, truncating (never rounding) the
/// fractional lamport.
pub fn lamports_from_sol(amount_sol: f64) -> u64 {
    (amount_sol * LAMPORTS_PER_SOL as f64).floor() as u64
}

/// Builds unsigned transfer and tip transactions. No I/O: the caller
/// stamps a fresh blockhash and requests signatures afterwards.
#[derive(Clone, Debug)]
pub struct TxFactory {
    compute_unit_limit: u32,
}

impl Default for TxFactory {
    fn default() -> Self {
        Self {
            compute_unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
        }
    }
}

impl TxFactory {
    pub fn new(compute_unit_limit: u32) -> Self {
        Self { compute_unit_limit }
    }

    /// Build an unsigned transfer transaction.
    ///
    /// With `priority_fee > 0` the instruction order is:
    /// set-compute-unit-price, set-compute-unit-limit, transfer.
    /// With `priority_fee == 0` only the transfer is attached.
    pub fn build_transfer(
        &self,
        from: &Pubkey,
        to: &Pubkey,
        amount_sol: f64,
        priority_fee: u64,
    ) -> Transaction {
        let lamports = lamports_from_sol(amount_sol);

        let mut instructions: Vec<Instruction> = Vec::with_capacity(3);
        if priority_fee > 0 {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
                priority_fee,
            ));
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(
                self.compute_unit_limit,
            ));
        }
        instructions.push(system_instruction::transfer(from, to, lamports));

        Transaction::new_with_payer(&instructions, Some(from))
    }

    /// Build an unsigned tip transaction: a plain transfer, no
    /// compute-budget instructions.
    pub fn build_tip(&self, from: &Pubkey, tip_account: &Pubkey, tip_amount_sol: f64) -> Transaction {
        let lamports = lamports_from_sol(tip_amount_sol);
        let ix = system_instruction::transfer(from, tip_account, lamports);
        Transaction::new_with_payer(&[ix], Some(from))
    }
}
