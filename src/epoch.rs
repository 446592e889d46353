use crate::{
    OutputIndex, RejectionReason, SignatureVerifier, Transaction, TransactionValidator, UtxoId,
    UtxoPool,
};

/// The result of one epoch: the accepted candidates in their original relative
/// order, the rejected candidates with the reason for each, and the pool state
/// after applying every accepted candidate.
#[derive(Debug)]
pub struct EpochOutcome {
    accepted: Vec<Transaction>,
    rejected: Vec<(Transaction, RejectionReason)>,
    pool: UtxoPool,
}

impl EpochOutcome {
    pub fn accepted(&self) -> &Vec<Transaction> {
        &self.accepted
    }

    pub fn rejected(&self) -> &Vec<(Transaction, RejectionReason)> {
        &self.rejected
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    /// Consumes the outcome and hands back the pool, e.g. to feed the next epoch.
    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }
}

/// Advances the ledger by one epoch: consumes an unordered batch of candidate
/// transactions and commits a mutually consistent subset of them to the pool.
pub struct EpochHandler<'a> {
    validator: TransactionValidator<'a>,
}

impl<'a> EpochHandler<'a> {
    pub fn new(verifier: &'a dyn SignatureVerifier) -> Self {
        Self {
            validator: TransactionValidator::new(verifier),
        }
    }

    /// Iterates the candidates as presented and validates each against the
    /// current, already-updated pool. An accepted candidate immediately consumes
    /// its claimed UTXOs and mints its outputs, so of two candidates claiming
    /// the same output the earlier one wins and the later one is rejected.
    /// This greedy single pass does not search for a larger consistent subset;
    /// presentation order is the deterministic tie-break.
    ///
    /// A rejected candidate has no effect and never aborts the pass. The only
    /// error this function itself can produce is a pool-contract violation,
    /// which validation makes unreachable.
    pub fn handle_epoch(
        &self,
        pool: UtxoPool,
        candidates: Vec<Transaction>,
    ) -> Result<EpochOutcome, String> {
        let mut pool = pool;
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for candidate in candidates {
            match self.validator.validate(&pool, &candidate) {
                Ok(()) => {
                    Self::apply(&mut pool, &candidate)?;
                    accepted.push(candidate);
                }
                Err(reason) => rejected.push((candidate, reason)),
            }
        }
        Ok(EpochOutcome {
            accepted,
            rejected,
            pool,
        })
    }

    /// Consumes the claimed UTXOs and mints one new UTXO per output, keyed by
    /// the transaction's own identity. Only called for a transaction that was
    /// validated against this exact pool state.
    fn apply(pool: &mut UtxoPool, transaction: &Transaction) -> Result<(), String> {
        for input in transaction.inputs() {
            pool.remove(&input.claimed_utxo())?;
        }
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            let utxo_id = UtxoId::new(*transaction.id(), OutputIndex::new(output_index as u32));
            pool.insert(utxo_id, output.clone())?;
        }
        Ok(())
    }
}
