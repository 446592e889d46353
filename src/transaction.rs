use crate::{Address, Amount, Sha256, Signature, UtxoId, UtxoPool};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction data, excluding all signatures.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // The number of the UTXO to be spent within that transaction, the first one is 0.
    output_index: OutputIndex,
    // Authenticates this transaction's claim on the referenced output. Must be
    // produced by the holder of the referenced output's recipient address over
    // the signing payload for this input.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex, signature: Signature) -> Self {
        Self {
            utxo_id,
            output_index,
            signature,
        }
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The identity of the unspent output this input claims.
    pub fn claimed_utxo(&self) -> UtxoId {
        UtxoId::new(self.utxo_id, self.output_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOutput {
    recipient: Address,
    amount: Amount,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.recipient)
    }
}

impl TransactionOutput {
    pub fn new(recipient: Address, amount: Amount) -> Self {
        Self { recipient, amount }
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// The canonical bytes that the holder of a claimed output signs: the claim's
/// UTXO reference followed by every output of the spending transaction.
/// No signature is ever part of the payload, so the payload is available both
/// before signing and during verification.
pub fn signing_payload(
    utxo_id: &TransactionId,
    output_index: &OutputIndex,
    outputs: &Vec<TransactionOutput>,
) -> Result<Vec<u8>, String> {
    bincode::serialize(&(utxo_id, output_index, outputs)).map_err(|e| e.to_string())
}

/// An immutable transfer of coins: the inputs claim unspent outputs of prior
/// transactions, and the outputs assign the claimed value to new recipients.
/// The identity is derived from the content at construction and never changes.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, String> {
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// The signing payload for the input at the given position.
    pub fn signing_payload(&self, input_index: usize) -> Result<Vec<u8>, String> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            format!(
                "No input at position: {} in transaction: {}",
                input_index, self.id
            )
        })?;
        signing_payload(input.utxo_id(), input.output_index(), &self.outputs)
    }

    /// The value this transaction leaves unassigned, resolving its claims in
    /// the given pool. Informational only; a zero fee is acceptable.
    pub fn fee(&self, pool: &UtxoPool) -> Result<Amount, String> {
        let mut input_total = Amount::zero();
        for input in &self.inputs {
            let utxo_id = input.claimed_utxo();
            let output = pool
                .output(&utxo_id)
                .ok_or_else(|| format!("UTXO not found in the pool: {}", utxo_id))?;
            input_total = input_total + output.amount();
        }
        let output_total = self.outputs.iter().map(TransactionOutput::amount).sum();
        Ok(input_total - output_total)
    }

    /// Derives the identity from the claim references and the outputs.
    /// Signatures are excluded, so the identity is stable across signing.
    fn hash_transaction_data(
        inputs: &Vec<TransactionInput>,
        outputs: &Vec<TransactionOutput>,
    ) -> Result<TransactionId, String> {
        let claims = inputs
            .iter()
            .map(|input| (input.utxo_id(), input.output_index()))
            .collect::<Vec<_>>();
        let data = bincode::serialize(&(claims, outputs)).map_err(|e| e.to_string())?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;

    fn output(seed: u8, amount: i64) -> TransactionOutput {
        let recipient = Keypair::from_seed([seed; 32]).address();
        TransactionOutput::new(recipient, Amount::new(amount))
    }

    fn claim(byte: u8, index: u32) -> (TransactionId, OutputIndex) {
        let utxo_id = TransactionId::new(Sha256::from_raw([byte; 32]));
        (utxo_id, OutputIndex::new(index))
    }

    fn signed_input(byte: u8, index: u32, signature: Signature) -> TransactionInput {
        let (utxo_id, output_index) = claim(byte, index);
        TransactionInput::new(utxo_id, output_index, signature)
    }

    #[test]
    fn identical_content_has_identical_id() {
        let keypair = Keypair::from_seed([1; 32]);
        let first = Transaction::new(
            vec![signed_input(9, 0, keypair.sign(b"payload"))],
            vec![output(2, 10)],
        )
        .unwrap();
        let second = Transaction::new(
            vec![signed_input(9, 0, keypair.sign(b"payload"))],
            vec![output(2, 10)],
        )
        .unwrap();
        assert_eq!(first.id(), second.id());
    }

    #[test]
    fn id_excludes_signatures() {
        let first = Transaction::new(
            vec![signed_input(9, 0, Signature::new(vec![1, 2, 3]))],
            vec![output(2, 10)],
        )
        .unwrap();
        let second = Transaction::new(
            vec![signed_input(9, 0, Signature::new(vec![4, 5, 6]))],
            vec![output(2, 10)],
        )
        .unwrap();
        assert_eq!(first.id(), second.id());
    }

    #[test]
    fn id_depends_on_outputs() {
        let signature = Signature::new(vec![]);
        let first = Transaction::new(
            vec![signed_input(9, 0, signature.clone())],
            vec![output(2, 10)],
        )
        .unwrap();
        let second =
            Transaction::new(vec![signed_input(9, 0, signature)], vec![output(2, 11)]).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn id_depends_on_claim_references() {
        let signature = Signature::new(vec![]);
        let first = Transaction::new(
            vec![signed_input(9, 0, signature.clone())],
            vec![output(2, 10)],
        )
        .unwrap();
        let second =
            Transaction::new(vec![signed_input(9, 1, signature)], vec![output(2, 10)]).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn signing_payload_differs_between_inputs() {
        let signature = Signature::new(vec![]);
        let transaction = Transaction::new(
            vec![
                signed_input(9, 0, signature.clone()),
                signed_input(9, 1, signature),
            ],
            vec![output(2, 10)],
        )
        .unwrap();
        assert_ne!(
            transaction.signing_payload(0).unwrap(),
            transaction.signing_payload(1).unwrap()
        );
    }

    #[test]
    fn signing_payload_matches_the_free_function() {
        let signature = Signature::new(vec![7; 64]);
        let outputs = vec![output(2, 10)];
        let transaction =
            Transaction::new(vec![signed_input(9, 0, signature)], outputs.clone()).unwrap();
        let (utxo_id, output_index) = claim(9, 0);
        assert_eq!(
            transaction.signing_payload(0).unwrap(),
            signing_payload(&utxo_id, &output_index, &outputs).unwrap()
        );
    }

    #[test]
    fn signing_payload_out_of_range_is_an_error() {
        let transaction = Transaction::new(vec![], vec![output(2, 10)]).unwrap();
        assert!(transaction.signing_payload(0).is_err());
    }

    #[test]
    fn fee_is_the_unassigned_input_value() {
        let mut pool = UtxoPool::new();
        let (utxo_id, output_index) = claim(9, 0);
        pool.insert(UtxoId::new(utxo_id, output_index), output(1, 10))
            .unwrap();

        let transaction = Transaction::new(
            vec![signed_input(9, 0, Signature::new(vec![]))],
            vec![output(2, 7)],
        )
        .unwrap();
        assert_eq!(transaction.fee(&pool), Ok(Amount::new(3)));
    }

    #[test]
    fn fee_of_an_unresolvable_claim_is_an_error() {
        let pool = UtxoPool::new();
        let transaction = Transaction::new(
            vec![signed_input(9, 0, Signature::new(vec![]))],
            vec![output(2, 7)],
        )
        .unwrap();
        assert!(transaction.fee(&pool).is_err());
    }
}
