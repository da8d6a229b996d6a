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

use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ciphersuites::IdemixCiphersuite;
use super::keys::{IssuerPublicKey, UserSecretKey};
use crate::errors::Error;
use crate::utils::encoding::{g1_to_bytes, ByteReader, ScalarExt, G1_BYTES, SCALAR_BYTES};
use crate::utils::random::random_scalar;
use crate::utils::util::idemix_utils::{hash_to_scalar, mul2, G1Projective, Scalar};

const NYM_SIGNATURE_LABEL: &[u8] = b"nymSign";

/// A commitment `nym = h_sk * sk + h_rand * rand_nym` to the user secret. `rand_nym` stays
/// with the user; fresh pseudonyms for the same key are unlinkable.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Pseudonym {
    pub nym: G1Projective,
    pub(crate) rand_nym: Scalar,
}

/// Proof of knowledge of `(sk, rand_nym)` behind a nym, bound to a message.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NymSignature {
    pub proof_c: Scalar,
    pub proof_s_sk: Scalar,
    pub proof_s_r_nym: Scalar,
    pub nonce: Scalar,
}

impl Pseudonym {
    pub const BYTES: usize = G1_BYTES + SCALAR_BYTES;

    pub fn new<R: RngCore + CryptoRng>(sk: &UserSecretKey, ipk: &IssuerPublicKey, rng: &mut R) -> Self {
        let rand_nym = random_scalar(rng);
        let nym = mul2(&ipk.h_sk, &sk.0, &ipk.h_rand, &rand_nym);
        Self { nym, rand_nym }
    }

    /// Includes the secret `rand_nym`: for the holder's own storage only.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::BYTES);
        bytes.extend_from_slice(&g1_to_bytes(&self.nym));
        bytes.extend_from_slice(&self.rand_nym.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(bytes);
        let pseudonym = Self { nym: reader.g1()?, rand_nym: reader.scalar()? };
        reader.finish()?;
        Ok(pseudonym)
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(g1_to_bytes(&self.nym)))
    }
}

impl NymSignature {
    pub const BYTES: usize = 4 * SCALAR_BYTES;

    /// Proves knowledge of `(sk, rand_nym)` behind `pseudonym`, bound to `msg`.
    ///
    /// # Arguments
    ///
    /// * `sk` - The user secret key.
    /// * `pseudonym` - The pseudonym to sign under.
    /// * `ipk` - The issuer public key providing `h_sk` and `h_rand`.
    /// * `msg` - The message to sign.
    /// * `rng` - Source of randomness for the blindings and the nonce.
    ///
    /// # Returns
    ///
    /// * The `NymSignature`, or an error if hashing the transcript fails.
    pub fn sign<CS, R>(
        sk: &UserSecretKey,
        pseudonym: &Pseudonym,
        ipk: &IssuerPublicKey,
        msg: &[u8],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        let r_sk = random_scalar(rng);
        let r_r_nym = random_scalar(rng);
        let t = mul2(&ipk.h_sk, &r_sk, &ipk.h_rand, &r_r_nym);

        let nonce = random_scalar(rng);
        let proof_c = nym_challenge::<CS>(&t, &pseudonym.nym, ipk, msg, &nonce)?;

        Ok(Self {
            proof_c,
            proof_s_sk: r_sk + proof_c * sk.0,
            proof_s_r_nym: r_r_nym + proof_c * pseudonym.rand_nym,
            nonce,
        })
    }

    /// # Returns
    ///
    /// * `true` if the signature proves knowledge of the opening of `nym` for `msg`.
    pub fn verify<CS: IdemixCiphersuite>(&self, nym: &G1Projective, ipk: &IssuerPublicKey, msg: &[u8]) -> bool {
        if bool::from(nym.is_identity()) {
            log::debug!("nym signature: identity nym");
            return false;
        }
        let t = mul2(&ipk.h_sk, &self.proof_s_sk, &ipk.h_rand, &self.proof_s_r_nym) - nym * self.proof_c;

        match nym_challenge::<CS>(&t, nym, ipk, msg, &self.nonce) {
            Ok(c) if c == self.proof_c => true,
            _ => {
                log::debug!("nym signature: invalid proof");
                false
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::BYTES);
        bytes.extend_from_slice(&self.proof_c.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_sk.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_r_nym.to_bytes_be());
        bytes.extend_from_slice(&self.nonce.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(bytes);
        let signature = Self {
            proof_c: reader.scalar()?,
            proof_s_sk: reader.scalar()?,
            proof_s_r_nym: reader.scalar()?,
            nonce: reader.scalar()?,
        };
        reader.finish()?;
        Ok(signature)
    }
}

/// Intermediate challenge over the transcript, then hashed again with the nonce.
fn nym_challenge<CS: IdemixCiphersuite>(
    t: &G1Projective,
    nym: &G1Projective,
    ipk: &IssuerPublicKey,
    msg: &[u8],
    nonce: &Scalar,
) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(NYM_SIGNATURE_LABEL);
    c_arr.extend_from_slice(&g1_to_bytes(t));
    c_arr.extend_from_slice(&g1_to_bytes(&ipk.h_sk));
    c_arr.extend_from_slice(&g1_to_bytes(&ipk.h_rand));
    c_arr.extend_from_slice(&g1_to_bytes(nym));
    c_arr.extend_from_slice(&ipk.hash);
    c_arr.extend_from_slice(msg);

    let c = hash_to_scalar::<CS>(&c_arr, &CS::dst(CS::NYM_SIGNATURE_DST))?;
    bind_nonce::<CS>(&c, nonce)
}

/// proof_c = H(c || nonce)
pub(crate) fn bind_nonce<CS: IdemixCiphersuite>(c: &Scalar, nonce: &Scalar) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::with_capacity(2 * SCALAR_BYTES);
    c_arr.extend_from_slice(&c.to_bytes_be());
    c_arr.extend_from_slice(&nonce.to_bytes_be());
    hash_to_scalar::<CS>(&c_arr, &CS::dst(CS::NONCE_DST))
}
