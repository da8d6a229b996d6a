// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Errors raised while building or decoding Idemix objects.
///
/// A proof that simply does not verify is never an [`Error`]: `check`, `ver` and `verify`
/// answer with `false` instead.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Duplicate attribute name: {0}")]
    DuplicateAttributeError(String),
    #[error("Expected {expected} attribute values, got {actual}")]
    AttributeCountMismatch { expected: usize, actual: usize },
    #[error("Invalid disclosure: {0}")]
    InvalidDisclosure(String),
    /// isk + E == 0 mod q, retry with fresh randomness
    #[error("Degenerate signing exponent")]
    DegenerateKeyError,
    #[error("Invalid credential request")]
    InvalidCredentialRequest,
    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error(" A == Identity_G1")]
    G1IdentityError,
    #[error("Error during serialization: {0}")]
    SerializationError(String),
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),
    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Error during computation of a Signature: {0}")]
    SignatureGenerationError(String),
}
