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

//! Idemix is an anonymous credential scheme built on BBS+ signatures over a pairing-friendly curve.
//! An issuer signs a commitment to the user's secret key together with a vector of attributes;
//! the user later proves possession of the credential without revealing the key.
//! - **Issuance**: the user commits to its secret with a [`cred_request::CredentialRequest`] bound to a
//!                 fresh issuer nonce; the issuer blind-signs it into a [`credential::IssuedCredential`],
//!                 which the user completes with its blinding factor.
//! - **Selective Disclosure**: a [`signature::Signature`] reveals only the attributes selected by a
//!                             disclosure mask and proves knowledge of the others.
//! - **Unlinkable Pseudonyms**: every presentation is made under a [`pseudonym::Pseudonym`], a fresh
//!                              commitment to the same secret key. [`pseudonym::NymSignature`] proves
//!                              ownership of a pseudonym without presenting a credential.
//! - **Freshness**: presentations and nym signatures carry a single-use nonce hashed into the challenge,
//!                  so two presentations of the same credential never share a challenge.
//!
//! All randomness is drawn from the `rng` handed to each generation function; verification
//! (`check`, `ver`, `verify`) is deterministic and answers with a `bool`.

/// Module for ciphersuites
pub mod ciphersuites;
/// Module for credential requests
pub mod cred_request;
/// Module for credentials
pub mod credential;
/// Module for issuer and user keys
pub mod keys;
/// Module for pseudonyms and nym signatures
pub mod pseudonym;
/// Module for credential presentations
pub mod signature;
