//! Protocol identifiers and invoice-number construction.
//!
//! Every derived key is namespaced by an invoice number: a deterministic
//! string binding the protocol's security level, its normalized name, and a
//! caller-chosen key identifier. The validation rules here are a security
//! boundary; they keep one protocol's keys from colliding with or injecting
//! into another's namespace.

use serde::{Deserialize, Serialize};

use crate::error::{DeriverError, DeriverResult};

/// Protocol names opening with this prefix embed a target protocol name for
/// scoped linkage disclosure and are allowed extra length.
pub const LINKAGE_PREFIX: &str = "specific linkage revelation ";

/// How strongly a protocol's keys are bound to a specific counterparty.
///
/// Serialized as its integer form; parsing any value outside `{0, 1, 2}`
/// fails with [`DeriverError::InvalidProtocolId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    /// Keys are not bound to any counterparty.
    Silent = 0,
    /// Keys are bound per application.
    App = 1,
    /// Keys are bound to one specific counterparty.
    Counterparty = 2,
}

impl SecurityLevel {
    /// The numeric level embedded in invoice numbers.
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = DeriverError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Silent),
            1 => Ok(Self::App),
            2 => Ok(Self::Counterparty),
            other => Err(DeriverError::InvalidProtocolId(format!(
                "security level must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> u8 {
        level.level()
    }
}

/// A protocol identifier: a security level plus a protocol name.
///
/// The name is kept as supplied; it is lower-cased, trimmed and validated
/// when an invoice number is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolId {
    /// Counterparty-binding strength for keys under this protocol.
    pub security_level: SecurityLevel,
    /// The protocol's name.
    pub name: String,
}

impl ProtocolId {
    /// Create a protocol identifier.
    pub fn new(security_level: SecurityLevel, name: impl Into<String>) -> Self {
        Self {
            security_level,
            name: name.into(),
        }
    }
}

/// Build the invoice number for a protocol and key identifier.
///
/// The protocol name is lower-cased and trimmed, then both identifiers are
/// validated:
///
/// - name length 5..=400 characters (..=430 with [`LINKAGE_PREFIX`])
/// - name drawn from `[a-z0-9 ]`, no consecutive spaces, and not ending in
///   `" protocol"`
/// - key identifier length 1..=800 characters
///
/// The output is `"{level}-{name}-{key_id}"`. This is a pure function:
/// identical inputs always produce the identical string, so independent
/// parties agree on the namespace without coordination.
pub fn invoice_number(protocol: &ProtocolId, key_id: &str) -> DeriverResult<String> {
    let name = protocol.name.to_lowercase().trim().to_string();

    let max_len = if name.starts_with(LINKAGE_PREFIX) { 430 } else { 400 };
    let name_len = name.chars().count();
    if name_len < 5 {
        return Err(DeriverError::InvalidProtocolId(
            "protocol names must be at least 5 characters".into(),
        ));
    }
    if name_len > max_len {
        return Err(DeriverError::InvalidProtocolId(format!(
            "protocol names must be at most {max_len} characters"
        )));
    }
    if name.contains("  ") {
        return Err(DeriverError::InvalidProtocolId(
            "protocol names cannot contain consecutive spaces".into(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ')
    {
        return Err(DeriverError::InvalidProtocolId(
            "protocol names may only contain letters, numbers and spaces".into(),
        ));
    }
    if name.ends_with(" protocol") {
        return Err(DeriverError::InvalidProtocolId(
            "protocol names must not end with \" protocol\"".into(),
        ));
    }

    let key_len = key_id.chars().count();
    if key_len < 1 {
        return Err(DeriverError::InvalidKeyId(
            "key ids must be at least 1 character".into(),
        ));
    }
    if key_len > 800 {
        return Err(DeriverError::InvalidKeyId(
            "key ids must be at most 800 characters".into(),
        ));
    }

    Ok(format!(
        "{}-{}-{}",
        protocol.security_level.level(),
        name,
        key_id
    ))
}
