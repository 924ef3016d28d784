//! Counterparty-scoped key derivation for wallet key management.
//!
//! One root private key produces unlimited derived key pairs and symmetric
//! keys, namespaced by a protocol identifier and a key identifier, and
//! scoped to a counterparty: a specific party, this instance itself, or
//! anyone. Two parties holding different root keys derive the *same* key
//! non-interactively, each using only public information plus their own
//! private scalar.
//!
//! # Example
//!
//! ```
//! use keymint::{Counterparty, KeyDeriver, PrivateKey, ProtocolId, SecurityLevel};
//!
//! let alice = KeyDeriver::new(PrivateKey::random(&mut rand::thread_rng()));
//! let bob = KeyDeriver::new(PrivateKey::random(&mut rand::thread_rng()));
//!
//! // Both sides name the same protocol and key; neither talks to the other.
//! let protocol = ProtocolId::new(SecurityLevel::Counterparty, "message encryption");
//! let alice_key = alice.derive_symmetric_key(
//!     &protocol,
//!     "conversation 1",
//!     &Counterparty::Key(bob.identity_key().clone()),
//! )?;
//! let bob_key = bob.derive_symmetric_key(
//!     &protocol,
//!     "conversation 1",
//!     &Counterparty::Key(alice.identity_key().clone()),
//! )?;
//! assert_eq!(alice_key, bob_key);
//! # Ok::<(), keymint::DeriverError>(())
//! ```

mod counterparty;
mod deriver;
mod error;
mod keys;
mod protocol;

pub use counterparty::Counterparty;
pub use deriver::KeyDeriver;
pub use error::{DeriverError, DeriverResult};
pub use keys::{PrivateKey, PublicKey, SymmetricKey};
pub use protocol::{invoice_number, ProtocolId, SecurityLevel, LINKAGE_PREFIX};
