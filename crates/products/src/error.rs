//! Errors raised while modelling options and generating variants.

use storefront_core::DomainError;
use thiserror::Error;

/// Failure of option editing, the combination engine, or the variant generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// Generation was requested for a product with no options at all.
    #[error("no options defined; add at least one option before generating variants")]
    NoOptions,

    /// An option has no values at generation time.
    #[error("option `{key}` has no values; add at least one value")]
    EmptyOption { key: String },

    /// An option name normalizes to an empty key (e.g. "!!!").
    #[error("option name `{name}` does not contain any letters or digits")]
    InvalidOptionName { name: String },

    /// A stored option key is not the normalized form of its name.
    #[error("`{key}` is not a valid option key")]
    InvalidOptionKey { key: String },

    /// Two options normalize to the same key.
    #[error("option key `{key}` is already defined")]
    DuplicateOptionKey { key: String },

    /// A value was added twice to the same option.
    #[error("option `{key}` already contains value `{value}`")]
    DuplicateValue { key: String, value: String },

    /// Blank option value.
    #[error("option `{key}` cannot contain an empty value")]
    EmptyValue { key: String },

    /// The option set expands to more combinations than allowed.
    #[error("too many combinations: {count} exceeds the limit of {limit}")]
    TooManyCombinations { count: u64, limit: u64 },

    /// A combination lacks a value for an option it should cover.
    #[error("malformed combination: missing value for option `{key}`")]
    MalformedCombination { key: String },

    /// A combination limit outside `1..=MAX_COMBINATION_LIMIT` was requested.
    #[error(
        "combination limit must be between 1 and {max}, got {limit}",
        max = crate::generator::MAX_COMBINATION_LIMIT
    )]
    InvalidLimit { limit: u64 },
}

impl From<VariantError> for DomainError {
    fn from(err: VariantError) -> Self {
        match err {
            VariantError::MalformedCombination { .. } => DomainError::invariant(err.to_string()),
            VariantError::DuplicateOptionKey { .. } | VariantError::DuplicateValue { .. } => {
                DomainError::conflict(err.to_string())
            }
            _ => DomainError::validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_combination_maps_to_invariant_violation() {
        let err: DomainError = VariantError::MalformedCombination { key: "size".into() }.into();
        assert_eq!(
            err,
            DomainError::invariant("malformed combination: missing value for option `size`")
        );
    }

    #[test]
    fn ceiling_maps_to_validation() {
        let err: DomainError = VariantError::TooManyCombinations {
            count: 110,
            limit: 100,
        }
        .into();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("110")));
    }

    #[test]
    fn invalid_limit_names_the_accepted_range() {
        let err = VariantError::InvalidLimit { limit: 0 };
        assert_eq!(
            err.to_string(),
            "combination limit must be between 1 and 10000, got 0"
        );
    }
}
