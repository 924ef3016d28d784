//! Counterparty identification for key derivation.

use std::str::FromStr;

use crate::error::DeriverError;
use crate::keys::PublicKey;

/// The other party a key is derived for.
///
/// `Myself` and `Anyone` are sentinels resolved against a deriver instance
/// at normalization time; `Key` carries an already validated public key, so
/// an unchecked point is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Counterparty {
    /// The deriver's own identity key.
    Myself,
    /// The fixed, universally known public key. Keys derived for `Anyone`
    /// are identically derivable by every party.
    Anyone,
    /// A specific counterparty's public key.
    Key(PublicKey),
}

impl From<PublicKey> for Counterparty {
    fn from(key: PublicKey) -> Self {
        Self::Key(key)
    }
}

impl FromStr for Counterparty {
    type Err = DeriverError;

    /// Parse `"self"`, `"anyone"`, or a hex-encoded public key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(DeriverError::InvalidCounterparty(
                "counterparty is empty".into(),
            )),
            "self" => Ok(Self::Myself),
            "anyone" => Ok(Self::Anyone),
            hex_key => PublicKey::from_hex(hex_key).map(Self::Key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivateKey;

    #[test]
    fn test_parse_sentinels() {
        assert_eq!("self".parse::<Counterparty>().unwrap(), Counterparty::Myself);
        assert_eq!("anyone".parse::<Counterparty>().unwrap(), Counterparty::Anyone);
    }

    #[test]
    fn test_parse_hex_public_key() {
        let key = PrivateKey::random(&mut rand::thread_rng()).public_key();
        let parsed: Counterparty = key.to_hex().parse().unwrap();
        assert_eq!(parsed, Counterparty::Key(key));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(
            "".parse::<Counterparty>(),
            Err(DeriverError::InvalidCounterparty(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["SELF", "nobody", "02zz", "0203"] {
            assert!(matches!(
                input.parse::<Counterparty>(),
                Err(DeriverError::InvalidCounterparty(_))
            ), "{input}");
        }
    }
}
