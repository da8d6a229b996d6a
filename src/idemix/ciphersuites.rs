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

use digest::HashMarker;
use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXmd, ExpandMsgXof};
use sha2::Sha256;
use sha3::Shake256;

/// Bytes of uniform output reduced to one scalar (`Scalar::from_okm`).
pub const EXPAND_LEN: usize = 48;

/// Hash configuration shared by issuer, user and verifier.
///
/// Every Fiat-Shamir challenge and every derived generator is domain separated with
/// `ID || <label>`, so two deployments using different suites never accept each other's proofs.
pub trait IdemixCiphersuite: Eq + 'static {
    const ID: &'static [u8];

    const GENERATOR_DST: &'static [u8] = b"GENERATOR_DST_";
    const IPK_PROOF_DST: &'static [u8] = b"IPK_PROOF_";
    const IPK_HASH_DST: &'static [u8] = b"IPK_HASH_";
    const CRED_REQUEST_DST: &'static [u8] = b"CRED_REQUEST_";
    const SIGNATURE_DST: &'static [u8] = b"SIGNATURE_";
    const NYM_SIGNATURE_DST: &'static [u8] = b"NYM_SIGNATURE_";
    const NONCE_DST: &'static [u8] = b"NONCE_";

    type HashAlg: HashMarker;
    type Expander: for<'a> ExpandMsg<'a>;

    fn dst(label: &[u8]) -> Vec<u8> {
        [Self::ID, label].concat()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bls12381Sha256;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bls12381Shake256;

impl IdemixCiphersuite for Bls12381Sha256 {
    const ID: &'static [u8] = b"IDEMIX_BLS12381G1_XMD:SHA-256_SSWU_RO_";
    type HashAlg = Sha256;
    type Expander = ExpandMsgXmd<Self::HashAlg>;
}

impl IdemixCiphersuite for Bls12381Shake256 {
    const ID: &'static [u8] = b"IDEMIX_BLS12381G1_XOF:SHAKE-256_SSWU_RO_";
    type HashAlg = Shake256;
    type Expander = ExpandMsgXof<Self::HashAlg>;
}
