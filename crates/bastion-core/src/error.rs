//! Error types for identifiers and the flag catalog.

use thiserror::Error;

use crate::flag::FlagKind;
use crate::id::FlagId;

/// Errors from parsing or validating identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdError {
    /// A region id was empty.
    #[error("region id must not be empty")]
    EmptyRegionId,
    /// A region id contained a character outside the allowed set.
    #[error("invalid region id '{id}': character {invalid:?} is not allowed")]
    InvalidRegionId {
        /// The raw id as given.
        id: String,
        /// The first offending character.
        invalid: char,
    },
    /// An account id was not a valid UUID.
    #[error("invalid account id '{raw}': {reason}")]
    InvalidAccountId {
        /// The raw string as given.
        raw: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors from flag registration and flag value validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A flag with the same (case-insensitive) name is already registered.
    #[error("flag '{name}' is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
    /// A flag name is empty, too long, or contains invalid characters.
    #[error("invalid flag name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// A flag's default value does not have the flag's kind.
    #[error("default for flag '{name}' must be of kind {expected:?}")]
    DefaultKindMismatch {
        /// The flag being registered.
        name: String,
        /// The flag's declared kind.
        expected: FlagKind,
    },
    /// The flag id is not registered in the catalog.
    #[error("unknown flag id {0}")]
    UnknownFlag(FlagId),
    /// A value of the wrong kind was assigned to a flag.
    #[error("flag '{name}' expects a {expected:?} value, got {actual:?}")]
    KindMismatch {
        /// The flag's name.
        name: String,
        /// The flag's declared kind.
        expected: FlagKind,
        /// The kind of the offending value.
        actual: FlagKind,
    },
}
