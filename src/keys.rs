use crate::Address;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt::{Display, Formatter};

/// A detached signature over a signing payload.
/// Carried as raw bytes so that a truncated or otherwise malformed signature
/// arriving in a candidate batch is representable and fails verification
/// rather than construction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(raw_bytes: Vec<u8>) -> Self {
        Self(raw_bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The capability to check that a signature authenticates a message under an address.
/// The validator receives this as a parameter, so tests can substitute a
/// deterministic implementation.
pub trait SignatureVerifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool;
}

/// Signature verification backed by ed25519.
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        let verifying_key = match VerifyingKey::from_bytes(address.as_bytes()) {
            Ok(verifying_key) => verifying_key,
            Err(_) => return false,
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature.as_slice()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

/// The signing half of the scheme. Only hosts and tests create keypairs;
/// the ledger core itself never signs anything.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Derives the keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn address(&self) -> Address {
        Address::from_raw(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes().to_vec())
    }
}
