//! # Core Domain Entities
//!
//! Principals, item keys and roles shared by the ledger and its observers.
//!
//! ## Clusters
//!
//! - **Keys**: `Upc`, `ProductId`, `Amount`
//! - **Principals**: `Identity`
//! - **Authorization**: `Role`

use crate::errors::TypeParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: KEYS
// =============================================================================

/// Universal Product Code. Unique within one entity type (Yarn or Fabric).
pub type Upc = u64;

/// Product identifier attached to a Fabric at creation.
pub type ProductId = u64;

/// Value units used for listing prices and payments.
pub type Amount = u64;

// =============================================================================
// CLUSTER B: PRINCIPALS
// =============================================================================

/// An authenticated principal (20-byte, Ethereum-style).
///
/// Used both as the custodian of an item and as the subject of role checks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Identity(pub [u8; 20]);

impl Identity {
    /// The all-zero identity.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Wrap raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an identity whose low 8 bytes hold `value` (big-endian).
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the all-zero identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let decoded =
            hex::decode(trimmed).map_err(|e| TypeParseError::InvalidIdentity(e.to_string()))?;
        let bytes: [u8; 20] = decoded.try_into().map_err(|v: Vec<u8>| {
            TypeParseError::InvalidIdentity(format!("expected 20 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }
}

// =============================================================================
// CLUSTER C: AUTHORIZATION
// =============================================================================

/// Capability flag granted by the registry owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Plants, acquires and processes yarn.
    Textile,
    /// Creates, cuts, produces and packs fabric.
    Producer,
    /// Audits yarn and certifies fabric.
    QualityChecker,
    /// Buys fabric.
    Consumer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [
        Role::Textile,
        Role::Producer,
        Role::QualityChecker,
        Role::Consumer,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Textile => "textile",
            Self::Producer => "producer",
            Self::QualityChecker => "quality_checker",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "textile" => Ok(Self::Textile),
            "producer" => Ok(Self::Producer),
            "qualitychecker" => Ok(Self::QualityChecker),
            "consumer" => Ok(Self::Consumer),
            _ => Err(TypeParseError::UnknownRole(s.to_string())),
        }
    }
}
