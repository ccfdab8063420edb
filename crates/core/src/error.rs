//! Validation errors raised by the mutation engine.
//!
//! Every variant describes a request that was rejected as a whole before any
//! change was applied. Conditions that are absorbed as no-ops (out-of-range
//! indexes, unknown element ids, absent wishlist keys) never produce an error.

use thiserror::Error;

use crate::farm::FarmType;
use crate::types::ElementId;
use crate::wishlist::NaturalKey;

/// Errors produced while validating or applying a profile mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The operation tag is not one the target understands.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// An operation was submitted without one of its required members.
    #[error("`{operation}` requires `{field}`")]
    MissingField {
        /// Operation tag as submitted.
        operation: String,
        /// Name of the missing member.
        field: &'static str,
    },

    /// An array operation targeted a production list other than the active one.
    #[error(
        "cannot update `{submitted}` on a {farm_type} farm; only `{allowed}` may be updated"
    )]
    FieldMismatch {
        /// Field named by the rejected operation.
        submitted: String,
        /// The single list field valid for `farm_type`.
        allowed: &'static str,
        /// Farm type in effect after the basic-info patch.
        farm_type: FarmType,
    },

    /// A new collection element proposed an id that is already taken.
    #[error("{collection} id `{id}` already exists")]
    DuplicateId {
        /// Collection name (`branch` or `image`).
        collection: &'static str,
        /// The colliding id.
        id: ElementId,
    },

    /// A field value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl MutationError {
    pub(crate) fn missing(operation: &str, field: &'static str) -> Self {
        Self::MissingField {
            operation: operation.to_owned(),
            field,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors produced by wishlist collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WishlistError {
    /// An item with the same natural key is already present.
    #[error("{0} is already in the wishlist")]
    Duplicate(NaturalKey),

    /// The wishlist has reached its configured capacity.
    #[error("wishlist is full (at most {max} items)")]
    Full {
        /// Configured capacity.
        max: usize,
    },

    /// The submitted item failed validation.
    #[error("invalid wishlist item: {0}")]
    InvalidItem(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mismatch_names_allowed_field() {
        let err = MutationError::FieldMismatch {
            submitted: "cropsGrown".to_owned(),
            allowed: "poultryType",
            farm_type: FarmType::Poultry,
        };
        assert_eq!(
            err.to_string(),
            "cannot update `cropsGrown` on a Poultry farm; only `poultryType` may be updated"
        );
    }

    #[test]
    fn test_missing_field_display() {
        let err = MutationError::missing("updateBranch", "branchId");
        assert_eq!(err.to_string(), "`updateBranch` requires `branchId`");
    }
}
