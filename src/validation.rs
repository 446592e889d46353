use crate::{Amount, OutputIndex, SignatureVerifier, Transaction, UtxoId, UtxoPool};
use std::fmt::{Display, Formatter};

/// Why a candidate transaction was not accepted. Every variant is an expected
/// outcome for adversarial or stale input, never a fault of the caller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RejectionReason {
    /// An input claims an output that is not in the current pool, either because
    /// it never existed, was already spent, or was claimed by an earlier input
    /// of this same transaction.
    MissingUtxo(UtxoId),
    /// The signature of the input at this position does not authenticate the
    /// claim under the recipient address of the claimed output.
    InvalidSignature { input_index: usize },
    /// The output at this position carries a negative amount.
    NegativeOutput { output_index: usize },
    /// The transaction would mint an output whose identity is already in the pool.
    DuplicateUtxo(UtxoId),
    /// The outputs assign more value than the inputs provide.
    OutputsExceedInputs {
        input_total: Amount,
        output_total: Amount,
    },
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::MissingUtxo(utxo_id) => {
                write!(f, "Claimed UTXO is not spendable: {}", utxo_id)
            }
            RejectionReason::InvalidSignature { input_index } => {
                write!(f, "Invalid signature for input at position: {}", input_index)
            }
            RejectionReason::NegativeOutput { output_index } => {
                write!(f, "Negative amount in output at position: {}", output_index)
            }
            RejectionReason::DuplicateUtxo(utxo_id) => {
                write!(f, "Minted UTXO is already in the pool: {}", utxo_id)
            }
            RejectionReason::OutputsExceedInputs {
                input_total,
                output_total,
            } => write!(
                f,
                "Outputs total {} exceeds inputs total {}",
                output_total, input_total
            ),
        }
    }
}

/// Decides whether a single transaction is acceptable against a pool of
/// unspent outputs. The decision depends only on the pool passed in; the
/// validator never mutates it.
pub struct TransactionValidator<'a> {
    verifier: &'a dyn SignatureVerifier,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(verifier: &'a dyn SignatureVerifier) -> Self {
        Self { verifier }
    }

    /// Checks, in order: every claim resolves to a distinct unspent output and
    /// its signature authenticates the claim; no output amount is negative; the
    /// minted output identities are fresh; and the outputs do not assign more
    /// value than the inputs provide. Value may be destroyed but never created.
    pub fn validate(
        &self,
        pool: &UtxoPool,
        transaction: &Transaction,
    ) -> Result<(), RejectionReason> {
        // Claims are tracked on a private snapshot: removing each claimed entry
        // makes a second claim of the same output by this transaction fail the
        // same containment test as a claim of a spent output.
        let mut unclaimed = pool.snapshot();
        let mut input_total = Amount::zero();
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let utxo_id = input.claimed_utxo();
            let claimed = match unclaimed.remove(&utxo_id) {
                Ok(output) => output,
                Err(_) => return Err(RejectionReason::MissingUtxo(utxo_id)),
            };
            let payload = match transaction.signing_payload(input_index) {
                Ok(payload) => payload,
                // A claim that cannot be canonically encoded cannot be authenticated.
                Err(_) => return Err(RejectionReason::InvalidSignature { input_index }),
            };
            if !self
                .verifier
                .verify(claimed.recipient(), &payload, input.signature())
            {
                return Err(RejectionReason::InvalidSignature { input_index });
            }
            input_total = input_total + claimed.amount();
        }

        let mut output_total = Amount::zero();
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(RejectionReason::NegativeOutput { output_index });
            }
            let minted = UtxoId::new(*transaction.id(), OutputIndex::new(output_index as u32));
            if unclaimed.contains(&minted) {
                return Err(RejectionReason::DuplicateUtxo(minted));
            }
            output_total = match output_total.checked_add(output.amount()) {
                Some(total) => total,
                // An overflowing total certainly exceeds whatever the inputs provide.
                None => {
                    return Err(RejectionReason::OutputsExceedInputs {
                        input_total,
                        output_total,
                    })
                }
            };
        }

        if output_total > input_total {
            return Err(RejectionReason::OutputsExceedInputs {
                input_total,
                output_total,
            });
        }
        Ok(())
    }

    /// Boolean form of `validate`.
    pub fn is_valid(&self, pool: &UtxoPool, transaction: &Transaction) -> bool {
        self.validate(pool, transaction).is_ok()
    }
}
