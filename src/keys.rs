//! Curve-facing key types and the low-level derivation primitives.
//!
//! This module wraps the secp256k1 scalar/point arithmetic behind three
//! value types:
//!
//! - **`PrivateKey`**: a non-zero secret scalar
//! - **`PublicKey`**: a validated, on-curve point
//! - **`SymmetricKey`**: 32 raw key bytes, zeroized on drop
//!
//! ## Child derivation
//!
//! A child key is the parent tweaked by an offset computed from a
//! counterparty point and an invoice number:
//!
//! ```text
//! tweak      = HMAC-SHA256(key: compress(shared_point), msg: invoice_number) mod n
//! child_priv = parent_priv + tweak
//! child_pub  = parent_pub  + tweak * G
//! ```
//!
//! where `shared_point` is the Diffie-Hellman point between the private side
//! and the counterparty. Because both parties can compute the same shared
//! point, the private derivation on one side and the public derivation on
//! the other land on the same key pair.

use hmac::{Hmac, Mac};
use secp256kfun::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{DeriverError, DeriverResult};

// ============================================================================
// Private Keys
// ============================================================================

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    scalar: Scalar<Secret, NonZero>,
}

impl PrivateKey {
    /// Generate a fresh random private key.
    pub fn random(rng: &mut (impl rand::RngCore + rand::CryptoRng)) -> Self {
        Self {
            scalar: Scalar::random(rng),
        }
    }

    /// Parse a private key from 32 big-endian bytes.
    ///
    /// Fails if the bytes encode zero or a value at or above the curve order.
    pub fn from_bytes(bytes: [u8; 32]) -> DeriverResult<Self> {
        let scalar: Scalar<Secret, Zero> = Scalar::from_bytes(bytes).ok_or_else(|| {
            DeriverError::Derivation("private key bytes exceed the curve order".into())
        })?;
        let scalar = scalar
            .non_zero()
            .ok_or_else(|| DeriverError::Derivation("private key cannot be zero".into()))?;
        Ok(Self { scalar })
    }

    /// Parse a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> DeriverResult<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| DeriverError::Derivation(format!("invalid private key hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DeriverError::Derivation("private keys are 32 bytes".into()))?;
        Self::from_bytes(bytes)
    }

    /// The key's 32 big-endian bytes. The caller is responsible for
    /// zeroizing the copy once it is no longer needed.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.scalar.to_bytes()
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        let scalar = self.scalar.clone();
        PublicKey(g!(scalar * G).normalize().public())
    }

    /// Compute the Diffie-Hellman shared point with `other` and return its
    /// 33-byte compressed encoding. The point itself never leaves this call.
    pub fn shared_secret(&self, other: &PublicKey) -> [u8; 33] {
        let scalar = self.scalar.clone();
        let point = other.0.clone();
        g!(scalar * point).normalize().to_bytes()
    }

    /// Derive the child private key tweaked by `(public_key, invoice_number)`.
    pub fn derive_child(
        &self,
        public_key: &PublicKey,
        invoice_number: &str,
    ) -> DeriverResult<PrivateKey> {
        let mut shared = self.shared_secret(public_key);
        let tweak = derivation_tweak(&shared, invoice_number);
        shared.zeroize();

        let parent = self.scalar.clone();
        let child = s!(parent + tweak)
            .non_zero()
            .ok_or_else(|| DeriverError::Derivation("derived child scalar is zero".into()))?;
        Ok(PrivateKey { scalar: child })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

// ============================================================================
// Public Keys
// ============================================================================

/// A validated secp256k1 public key. Always on the curve by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKey(Point);

impl PublicKey {
    /// Parse a public key from SEC1 bytes: 33-byte compressed or 65-byte
    /// uncompressed. Fails if the encoding is malformed or the point is not
    /// on the curve.
    pub fn from_bytes(bytes: &[u8]) -> DeriverResult<Self> {
        let point = match bytes.len() {
            33 => {
                let array: [u8; 33] = bytes.try_into().expect("length checked");
                Point::from_bytes(array)
            }
            65 => {
                let array: [u8; 65] = bytes.try_into().expect("length checked");
                Point::from_bytes_uncompressed(array)
            }
            n => {
                return Err(DeriverError::InvalidCounterparty(format!(
                    "public keys are 33 or 65 bytes, got {n}"
                )))
            }
        };
        point.map(Self).ok_or_else(|| {
            DeriverError::InvalidCounterparty("point is not on the curve".into())
        })
    }

    /// Parse a public key from its hex encoding.
    pub fn from_hex(hex_str: &str) -> DeriverResult<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| DeriverError::InvalidCounterparty(format!("invalid public key hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The 33-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; 33] {
        self.0.to_bytes()
    }

    /// The compressed encoding as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The fixed, universally known public key used for `anyone`
    /// derivations: scalar one times the curve's base point. Identical for
    /// every party, so keys derived against it are derivable by every party.
    pub fn for_anyone() -> Self {
        let one: Scalar<Public, NonZero> = Scalar::one();
        Self(g!(one * G).normalize())
    }

    /// Derive the child public key tweaked by `(private_key, invoice_number)`.
    ///
    /// This is the asymmetric complement of [`PrivateKey::derive_child`]:
    /// the holder of the matching private key reaches the same tweak from
    /// the other side of the shared secret.
    pub fn derive_child(
        &self,
        private_key: &PrivateKey,
        invoice_number: &str,
    ) -> DeriverResult<PublicKey> {
        let mut shared = private_key.shared_secret(self);
        let tweak = derivation_tweak(&shared, invoice_number);
        shared.zeroize();

        let parent = self.0.clone();
        let child = g!(parent + tweak * G)
            .normalize()
            .non_zero()
            .ok_or_else(|| DeriverError::Derivation("derived child point is at infinity".into()))?;
        Ok(PublicKey(child))
    }
}

// ============================================================================
// Symmetric Keys
// ============================================================================

/// A 32-byte symmetric key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Construct a symmetric key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

// ============================================================================
// Derivation Tweak
// ============================================================================

/// HMAC-SHA256 over `message`, keyed with `key`.
pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    let digest = mac.finalize().into_bytes();
    digest[..].try_into().expect("HMAC-SHA256 output is 32 bytes")
}

/// Compute the child-key tweak for a shared point and invoice number,
/// interpreted big-endian and reduced mod the curve order.
fn derivation_tweak(shared_point: &[u8; 33], invoice_number: &str) -> Scalar<Public, Zero> {
    let digest = hmac_sha256(shared_point, invoice_number.as_bytes());
    Scalar::from_bytes_mod_order(digest)
}

// ============================================================================
// Tests
// ============================================================================
