//! # Fishing Error Types
//!
//! All errors that can occur in the fishing engine.

use fishy_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the fishing engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FishingError {
    /// Location string is not one of lake, river or ocean.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Equipment category is not one of the five recognized names.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// Tier outside the range accepted for this record.
    #[error("invalid {what} tier: {tier}")]
    InvalidTier {
        /// What the tier belongs to (bait, rod, ...).
        what: String,
        /// The rejected tier.
        tier: i64,
    },

    /// Fish inventory has no room left.
    #[error("inventory full: {size}/{capacity}")]
    InventoryFull {
        /// Fish currently held.
        size: i64,
        /// Capacity from the vehicle tier.
        capacity: i64,
    },

    /// Adding bait would overflow the bait box.
    #[error("bait capacity exceeded: {current} + {amount} > {capacity}")]
    CapacityExceeded {
        /// Bait currently held of this tier.
        current: i64,
        /// Amount requested.
        amount: i64,
        /// Capacity from the bait-box tier.
        capacity: i64,
    },

    /// Removing bait would drive the count below zero.
    #[error("insufficient bait: tier {tier} has {available}, tried to remove {requested}")]
    InsufficientBait {
        /// Bait tier.
        tier: u8,
        /// Bait held.
        available: i64,
        /// Amount requested for removal.
        requested: i64,
    },

    /// Equipment upgrade skipped a tier.
    #[error("{category} is tier {current}, cannot move to tier {requested}")]
    ProgressionViolation {
        /// Equipment category.
        category: String,
        /// Currently equipped tier.
        current: u8,
        /// Tier requested.
        requested: u8,
    },

    /// Player is blacklisted.
    #[error("player is blacklisted")]
    Blacklisted,

    /// Key-value store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Catalog data is missing or malformed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Engine configuration is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Randomness source failed.
    #[error("random source failed: {0}")]
    Random(String),

    /// Background task queue has shut down.
    #[error("task queue closed")]
    QueueClosed,
}

/// Broad classification of a [`FishingError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was mutated.
    Validation,
    /// Expected domain outcome the caller should present to the player.
    Rejection,
    /// Store, catalog or runtime failure; the caller should retry later.
    Infrastructure,
}

impl FishingError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLocation(_) | Self::InvalidItem(_) | Self::InvalidTier { .. } => {
                ErrorKind::Validation
            }
            Self::InventoryFull { .. }
            | Self::CapacityExceeded { .. }
            | Self::InsufficientBait { .. }
            | Self::ProgressionViolation { .. }
            | Self::Blacklisted => ErrorKind::Rejection,
            Self::Store(_)
            | Self::Catalog(_)
            | Self::Config(_)
            | Self::Random(_)
            | Self::QueueClosed => ErrorKind::Infrastructure,
        }
    }

    /// Returns `true` for store, catalog and runtime failures.
    #[inline]
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Infrastructure)
    }
}

/// Result type for fishing operations.
pub type FishingResult<T> = Result<T, FishingError>;
