use crate::{Address, Amount, OutputIndex, TransactionId, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifies one spendable output across the ledger's history: the transaction
/// that created it and the position of the output within that transaction.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct UtxoId {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl UtxoId {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for UtxoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A pool of confirmed and unspent transaction outputs.
/// Every key corresponds to an output that no accepted transaction has claimed yet.
#[derive(Debug, Clone)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by the transaction that created them
    // and their position within it.
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    /// Looks up the output for the given identity, or None if it is not in the pool.
    pub fn output(&self, utxo_id: &UtxoId) -> Option<&TransactionOutput> {
        self.utxos.get(utxo_id)
    }

    /// Adds a new spendable entry. The identity must not already be present;
    /// fresh transaction identifiers paired with their own output positions are
    /// unique by construction, so a collision is a caller error.
    pub fn insert(&mut self, utxo_id: UtxoId, output: TransactionOutput) -> Result<(), String> {
        if self.utxos.contains_key(&utxo_id) {
            return Err(format!("UTXO is already in the pool: {}", utxo_id));
        }
        self.utxos.insert(utxo_id, output);
        Ok(())
    }

    /// Removes an entry and returns the output it held.
    pub fn remove(&mut self, utxo_id: &UtxoId) -> Result<TransactionOutput, String> {
        self.utxos
            .remove(utxo_id)
            .ok_or_else(|| format!("UTXO not found in the pool: {}", utxo_id))
    }

    /// An independent copy that shares no state with this pool, so a trial
    /// validation can simulate removals without touching the original.
    pub fn snapshot(&self) -> UtxoPool {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn utxos(&self) -> impl Iterator<Item = (&UtxoId, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Total unspent value per recipient address.
    pub fn address_balances(&self) -> HashMap<Address, Amount> {
        let mut balances: HashMap<Address, Amount> = HashMap::new();
        for output in self.utxos.values() {
            let balance = balances
                .entry(*output.recipient())
                .or_insert_with(Amount::zero);
            *balance = *balance + output.amount();
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keypair, Sha256};

    fn utxo_id(byte: u8, index: u32) -> UtxoId {
        UtxoId::new(
            TransactionId::new(Sha256::from_raw([byte; 32])),
            OutputIndex::new(index),
        )
    }

    fn output(seed: u8, amount: i64) -> TransactionOutput {
        let recipient = Keypair::from_seed([seed; 32]).address();
        TransactionOutput::new(recipient, Amount::new(amount))
    }

    #[test]
    fn insert_then_lookup_and_remove() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo_id(1, 0), output(1, 10)).unwrap();

        assert!(pool.contains(&utxo_id(1, 0)));
        assert_eq!(pool.output(&utxo_id(1, 0)).unwrap().amount(), 10.into());

        let removed = pool.remove(&utxo_id(1, 0)).unwrap();
        assert_eq!(removed.amount(), 10.into());
        assert!(!pool.contains(&utxo_id(1, 0)));
        assert!(pool.is_empty());
    }

    #[test]
    fn lookup_of_absent_utxo_is_none() {
        let pool = UtxoPool::new();
        assert!(pool.output(&utxo_id(1, 0)).is_none());
    }

    #[test]
    fn duplicate_insert_is_an_error() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo_id(1, 0), output(1, 10)).unwrap();
        assert!(pool.insert(utxo_id(1, 0), output(2, 20)).is_err());
        // The original entry is untouched.
        assert_eq!(pool.output(&utxo_id(1, 0)).unwrap().amount(), 10.into());
    }

    #[test]
    fn remove_of_absent_utxo_is_an_error() {
        let mut pool = UtxoPool::new();
        assert!(pool.remove(&utxo_id(1, 0)).is_err());
    }

    #[test]
    fn same_transaction_different_output_indices_are_distinct() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo_id(1, 0), output(1, 10)).unwrap();
        pool.insert(utxo_id(1, 1), output(1, 20)).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.utxos().count(), 2);
    }

    #[test]
    fn snapshot_is_independent_of_the_original() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo_id(1, 0), output(1, 10)).unwrap();

        let mut snapshot = pool.snapshot();
        snapshot.remove(&utxo_id(1, 0)).unwrap();
        snapshot.insert(utxo_id(2, 0), output(2, 5)).unwrap();

        assert!(pool.contains(&utxo_id(1, 0)));
        assert!(!pool.contains(&utxo_id(2, 0)));
    }

    #[test]
    fn address_balances_aggregates_outputs_per_recipient() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo_id(1, 0), output(1, 10)).unwrap();
        pool.insert(utxo_id(1, 1), output(1, 15)).unwrap();
        pool.insert(utxo_id(2, 0), output(2, 7)).unwrap();

        let balances = pool.address_balances();
        let first = Keypair::from_seed([1; 32]).address();
        let second = Keypair::from_seed([2; 32]).address();
        assert_eq!(balances.get(&first), Some(&Amount::new(25)));
        assert_eq!(balances.get(&second), Some(&Amount::new(7)));
    }
}
