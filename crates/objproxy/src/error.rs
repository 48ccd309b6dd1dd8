// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for proxy object operations

use crate::generation::Generation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid object name: {0:?}")]
    InvalidName(String),

    #[error("Record for object {actual:?} does not match proxy for {expected:?}")]
    ObjectMismatch { expected: String, actual: String },

    #[error("Invalid range: offset {offset} length {length} exceeds the maximum object size")]
    InvalidRange { offset: u64, length: u64 },

    #[error("Invalid length {0}: exceeds the maximum object size")]
    InvalidLength(u64),

    #[error("Generation {generation} of {name:?} no longer exists")]
    GenerationNotFound { name: String, generation: Generation },

    #[error(
        "Generation {generation} of {name:?} has {actual} bytes, but its record says {expected}"
    )]
    SizeMismatch {
        name: String,
        generation: Generation,
        expected: u64,
        actual: u64,
    },

    #[error("Cannot allocate {0} bytes to materialize the object")]
    Allocation(u64),

    #[error("Injected failure: {0}")]
    Injected(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid object path: {0}")]
    Path(#[from] object_store::path::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    pub fn object_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        Error::ObjectMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn generation_not_found<N: Into<String>>(name: N, generation: Generation) -> Self {
        Error::GenerationNotFound {
            name: name.into(),
            generation,
        }
    }

    /// True for errors caused by the caller's arguments rather than the store.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidName(_)
                | Error::ObjectMismatch { .. }
                | Error::InvalidRange { .. }
                | Error::InvalidLength(_)
        )
    }
}
