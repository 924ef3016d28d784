//! The key deriver: one root key, unlimited namespaced derived keys.
//!
//! A [`KeyDeriver`] owns a single root private key for its lifetime and
//! derives per-protocol, per-key-identifier keys scoped to a counterparty.
//! Derivation is deterministic and non-interactive: two instances holding
//! different root keys reach the same key pair from opposite sides of the
//! relationship, because each can compute the Diffie-Hellman point the
//! child-key tweak is taken from.
//!
//! ## Operations
//!
//! - **Key derivation**: public, private and symmetric keys, namespaced by
//!   an invoice number built from the protocol and key identifiers.
//! - **Secret revelation**: controlled disclosure of the root-to-counterparty
//!   shared secret, either wholesale or scoped to one protocol/key pair, so
//!   an auditor can verify derived-key relationships without the root key.
//!
//! Every operation is synchronous and pure; nothing is cached or persisted
//! beyond the root key and its identity key, so one instance is safe to
//! share across threads.

use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::counterparty::Counterparty;
use crate::error::{DeriverError, DeriverResult};
use crate::keys::{hmac_sha256, PrivateKey, PublicKey, SymmetricKey};
use crate::protocol::{invoice_number, ProtocolId};

/// Fixed tweak for the self-equality safeguard in
/// [`KeyDeriver::reveal_counterparty_secret`]. Not a valid invoice number,
/// so no caller-reachable namespace can collide with it.
const SAFEGUARD_INVOICE: &str = "test";

/// Derives keys and revelation secrets from one root private key.
pub struct KeyDeriver {
    root_key: PrivateKey,
    identity_key: PublicKey,
}

impl KeyDeriver {
    /// Create a deriver owning `root_key`. The identity key is computed once
    /// here and never changes for the lifetime of the instance.
    pub fn new(root_key: PrivateKey) -> Self {
        let identity_key = root_key.public_key();
        Self {
            root_key,
            identity_key,
        }
    }

    /// The root private key this instance derives from.
    pub fn root_key(&self) -> &PrivateKey {
        &self.root_key
    }

    /// The public key corresponding to the root key.
    pub fn identity_key(&self) -> &PublicKey {
        &self.identity_key
    }

    /// Resolve a counterparty to its canonical public key: `Myself` becomes
    /// this instance's identity key, `Anyone` the fixed shared key, and
    /// `Key` passes through its validated point.
    pub fn normalize_counterparty(&self, counterparty: &Counterparty) -> PublicKey {
        match counterparty {
            Counterparty::Myself => self.identity_key.clone(),
            Counterparty::Anyone => PublicKey::for_anyone(),
            Counterparty::Key(key) => key.clone(),
        }
    }

    /// Derive the public key for `(protocol, key_id, counterparty)`.
    ///
    /// With `for_self` false, the counterparty's point is tweaked by the
    /// root key: the result is the counterparty's derived public key for
    /// this relationship. With `for_self` true, the root key is tweaked by
    /// the counterparty's point instead, yielding the public half of this
    /// instance's own derived key pair.
    pub fn derive_public_key(
        &self,
        protocol: &ProtocolId,
        key_id: &str,
        counterparty: &Counterparty,
        for_self: bool,
    ) -> DeriverResult<PublicKey> {
        let counterparty = self.normalize_counterparty(counterparty);
        let invoice = invoice_number(protocol, key_id)?;
        trace!(protocol = %protocol.name, for_self, "deriving public key");
        if for_self {
            Ok(self
                .root_key
                .derive_child(&counterparty, &invoice)?
                .public_key())
        } else {
            counterparty.derive_child(&self.root_key, &invoice)
        }
    }

    /// Derive this instance's private key for `(protocol, key_id,
    /// counterparty)`: the root scalar tweaked by the counterparty's point
    /// and the invoice number.
    pub fn derive_private_key(
        &self,
        protocol: &ProtocolId,
        key_id: &str,
        counterparty: &Counterparty,
    ) -> DeriverResult<PrivateKey> {
        let counterparty = self.normalize_counterparty(counterparty);
        let invoice = invoice_number(protocol, key_id)?;
        trace!(protocol = %protocol.name, "deriving private key");
        self.root_key.derive_child(&counterparty, &invoice)
    }

    /// Derive the symmetric key for `(protocol, key_id, counterparty)`: the
    /// x-coordinate of the Diffie-Hellman point between this instance's
    /// derived private key and the counterparty's derived public key.
    ///
    /// Both sides of the relationship obtain identical key material from
    /// their own root keys.
    pub fn derive_symmetric_key(
        &self,
        protocol: &ProtocolId,
        key_id: &str,
        counterparty: &Counterparty,
    ) -> DeriverResult<SymmetricKey> {
        // Map `Anyone` to its fixed key up front; normalization inside the
        // nested derivations performs the same mapping.
        let counterparty = match counterparty {
            Counterparty::Anyone => Counterparty::Key(PublicKey::for_anyone()),
            other => other.clone(),
        };
        trace!(protocol = %protocol.name, "deriving symmetric key");

        let public_key = self.derive_public_key(protocol, key_id, &counterparty, false)?;
        let private_key = self.derive_private_key(protocol, key_id, &counterparty)?;

        let mut shared = private_key.shared_secret(&public_key);
        let key = SymmetricKey::from_bytes(
            shared[1..]
                .try_into()
                .expect("compressed points carry a 32-byte x coordinate"),
        );
        shared.zeroize();
        Ok(key)
    }

    /// Reveal the compressed root-to-counterparty shared point.
    ///
    /// Holding this value lets the counterparty, or an auditor it is
    /// disclosed to, verify every key derived for this relationship without
    /// being able to forge any of them. Revelation for `Myself` is refused
    /// outright; a supplied key that turns out to equal this instance's own
    /// identity key is caught by deriving a throwaway child for both sides
    /// under a fixed tweak and comparing.
    pub fn reveal_counterparty_secret(&self, counterparty: &Counterparty) -> DeriverResult<[u8; 33]> {
        if matches!(counterparty, Counterparty::Myself) {
            debug!("refusing to reveal counterparty secret for self");
            return Err(DeriverError::PolicyViolation(
                "counterparty secrets cannot be revealed for self".into(),
            ));
        }
        let normalized = self.normalize_counterparty(counterparty);

        let own = self
            .root_key
            .derive_child(&self.identity_key, SAFEGUARD_INVOICE)?;
        let other = self.root_key.derive_child(&normalized, SAFEGUARD_INVOICE)?;
        if own.to_bytes() == other.to_bytes() {
            debug!("refusing to reveal counterparty secret: key matches own identity");
            return Err(DeriverError::PolicyViolation(
                "counterparty secrets cannot be revealed for self".into(),
            ));
        }

        Ok(self.root_key.shared_secret(&normalized))
    }

    /// Reveal the derivation secret for exactly one protocol/key pair:
    /// HMAC-SHA256 over the invoice number, keyed with the compressed
    /// root-to-counterparty shared point.
    ///
    /// Unlike [`reveal_counterparty_secret`](Self::reveal_counterparty_secret),
    /// this discloses nothing about keys outside the named namespace.
    pub fn reveal_specific_secret(
        &self,
        counterparty: &Counterparty,
        protocol: &ProtocolId,
        key_id: &str,
    ) -> DeriverResult<[u8; 32]> {
        let normalized = self.normalize_counterparty(counterparty);
        let invoice = invoice_number(protocol, key_id)?;

        let mut shared = self.root_key.shared_secret(&normalized);
        let secret = hmac_sha256(&shared, invoice.as_bytes());
        shared.zeroize();
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SecurityLevel;

    fn deriver() -> KeyDeriver {
        KeyDeriver::new(PrivateKey::random(&mut rand::thread_rng()))
    }

    fn protocol() -> ProtocolId {
        ProtocolId::new(SecurityLevel::Counterparty, "document signing")
    }

    #[test]
    fn test_normalize_self_matches_own_identity_key() {
        let deriver = deriver();
        let as_sentinel = deriver.normalize_counterparty(&Counterparty::Myself);
        let as_key = deriver
            .normalize_counterparty(&Counterparty::Key(deriver.identity_key().clone()));
        assert_eq!(as_sentinel, as_key);
        assert_eq!(&as_sentinel, deriver.identity_key());
    }

    #[test]
    fn test_normalize_anyone_is_instance_independent() {
        let a = deriver();
        let b = deriver();
        assert_eq!(
            a.normalize_counterparty(&Counterparty::Anyone),
            b.normalize_counterparty(&Counterparty::Anyone)
        );
    }

    #[test]
    fn test_derived_private_key_matches_for_self_public_key() {
        let deriver = deriver();
        let other = Counterparty::Key(PrivateKey::random(&mut rand::thread_rng()).public_key());

        let private_key = deriver
            .derive_private_key(&protocol(), "k1", &other)
            .unwrap();
        let public_key = deriver
            .derive_public_key(&protocol(), "k1", &other, true)
            .unwrap();

        assert_eq!(private_key.public_key(), public_key);
    }

    #[test]
    fn test_invalid_protocol_rejected_before_derivation() {
        let deriver = deriver();
        let err = deriver
            .derive_private_key(
                &ProtocolId::new(SecurityLevel::Silent, "abc"),
                "k1",
                &Counterparty::Anyone,
            )
            .unwrap_err();
        assert!(matches!(err, DeriverError::InvalidProtocolId(_)));
    }

    #[test]
    fn test_symmetric_key_anyone_mapping_is_stable() {
        // `Anyone` and its fixed public key are the same counterparty.
        let deriver = deriver();
        let via_sentinel = deriver
            .derive_symmetric_key(&protocol(), "k1", &Counterparty::Anyone)
            .unwrap();
        let via_key = deriver
            .derive_symmetric_key(&protocol(), "k1", &Counterparty::Key(PublicKey::for_anyone()))
            .unwrap();
        assert_eq!(via_sentinel, via_key);
    }

    #[test]
    fn test_reveal_counterparty_secret_refuses_self_sentinel() {
        let deriver = deriver();
        let err = deriver
            .reveal_counterparty_secret(&Counterparty::Myself)
            .unwrap_err();
        assert!(matches!(err, DeriverError::PolicyViolation(_)));
    }

    #[test]
    fn test_reveal_counterparty_secret_refuses_own_identity_key() {
        // The sentinel check alone would miss this; the throwaway-child
        // equality safeguard catches it.
        let deriver = deriver();
        let disguised = Counterparty::Key(deriver.identity_key().clone());
        let err = deriver.reveal_counterparty_secret(&disguised).unwrap_err();
        assert!(matches!(err, DeriverError::PolicyViolation(_)));
    }

    #[test]
    fn test_reveal_counterparty_secret_is_the_shared_point() {
        let deriver = deriver();
        let other = PrivateKey::random(&mut rand::thread_rng());
        let revealed = deriver
            .reveal_counterparty_secret(&Counterparty::Key(other.public_key()))
            .unwrap();
        assert_eq!(revealed, deriver.root_key().shared_secret(&other.public_key()));
    }

    #[test]
    fn test_reveal_specific_secret_validates_namespace() {
        let deriver = deriver();
        let other = Counterparty::Key(PrivateKey::random(&mut rand::thread_rng()).public_key());
        let err = deriver
            .reveal_specific_secret(&other, &protocol(), "")
            .unwrap_err();
        assert!(matches!(err, DeriverError::InvalidKeyId(_)));
    }
}
