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

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ciphersuites::IdemixCiphersuite;
use super::keys::{IssuerPublicKey, UserSecretKey};
use crate::errors::Error;
use crate::utils::encoding::{g1_to_bytes, ByteReader, ScalarExt, SCALAR_BYTES};
use crate::utils::random::random_scalar;
use crate::utils::util::idemix_utils::{hash_to_scalar, mul2, G1Projective, Scalar};

const CRED_REQUEST_LABEL: &[u8] = b"credRequest";

/// Blinding scalar (`credS1`) hiding the user secret in the request nym. The user keeps it
/// until the credential is completed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlindFactor(pub(crate) Scalar);

impl BlindFactor {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(random_scalar(rng))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0.to_bytes_be()
    }

    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error> {
        Ok(Self(Scalar::from_bytes_be(bytes)?))
    }
}

/// Request for a credential: a commitment `nym = h_sk * sk + h_rand * credS1` with a proof of
/// knowledge of its opening, bound to the issuer nonce and key.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CredentialRequest {
    pub nym: G1Projective,
    pub issuer_nonce: Scalar,
    pub proof_c: Scalar,
    pub proof_s1: Scalar,
    pub proof_s2: Scalar,
}

impl CredentialRequest {
    pub const BYTES: usize = crate::utils::encoding::G1_BYTES + 4 * SCALAR_BYTES;

    /// Computes the request nym `h_sk * sk + h_rand * cred_s1` and a proof of knowledge of its
    /// opening.
    ///
    /// # Arguments
    ///
    /// * `sk` - The user secret key.
    /// * `cred_s1` - Blinding factor, kept by the user to complete the credential later.
    /// * `issuer_nonce` - Fresh nonce handed out by the issuer for this request.
    /// * `ipk` - The issuer public key.
    /// * `rng` - Source of randomness for the proof blindings.
    ///
    /// # Returns
    ///
    /// * The `CredentialRequest`, or an error if hashing the transcript fails.
    pub fn create<CS, R>(
        sk: &UserSecretKey,
        cred_s1: &BlindFactor,
        issuer_nonce: &Scalar,
        ipk: &IssuerPublicKey,
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        let nym = mul2(&ipk.h_sk, &sk.0, &ipk.h_rand, &cred_s1.0);

        let r_sk = random_scalar(rng);
        let r_rand = random_scalar(rng);
        let t = mul2(&ipk.h_sk, &r_sk, &ipk.h_rand, &r_rand);

        let proof_c = request_challenge::<CS>(&t, ipk, &nym, issuer_nonce)?;
        let proof_s1 = proof_c * sk.0 + r_sk;
        let proof_s2 = proof_c * cred_s1.0 + r_rand;

        Ok(Self { nym, issuer_nonce: *issuer_nonce, proof_c, proof_s1, proof_s2 })
    }

    /// Verifies the proof of knowledge of the nym opening.
    ///
    /// # Arguments
    ///
    /// * `ipk` - The issuer public key the request was made for.
    ///
    /// # Returns
    ///
    /// * `true` if the proof verifies against `ipk` and the embedded nonce.
    pub fn check<CS: IdemixCiphersuite>(&self, ipk: &IssuerPublicKey) -> bool {
        if bool::from(self.nym.is_identity()) {
            log::debug!("credential request: identity nym");
            return false;
        }
        let t = mul2(&ipk.h_sk, &self.proof_s1, &ipk.h_rand, &self.proof_s2) - self.nym * self.proof_c;

        match request_challenge::<CS>(&t, ipk, &self.nym, &self.issuer_nonce) {
            Ok(c) if c == self.proof_c => true,
            _ => {
                log::debug!("credential request: invalid proof of knowledge");
                false
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::BYTES);
        bytes.extend_from_slice(&g1_to_bytes(&self.nym));
        bytes.extend_from_slice(&self.issuer_nonce.to_bytes_be());
        bytes.extend_from_slice(&self.proof_c.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s1.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s2.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(bytes);
        let request = Self {
            nym: reader.g1()?,
            issuer_nonce: reader.scalar()?,
            proof_c: reader.scalar()?,
            proof_s1: reader.scalar()?,
            proof_s2: reader.scalar()?,
        };
        reader.finish()?;
        Ok(request)
    }
}

fn request_challenge<CS: IdemixCiphersuite>(
    t: &G1Projective,
    ipk: &IssuerPublicKey,
    nym: &G1Projective,
    issuer_nonce: &Scalar,
) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(CRED_REQUEST_LABEL);
    c_arr.extend_from_slice(&g1_to_bytes(t));
    c_arr.extend_from_slice(&g1_to_bytes(&ipk.h_sk));
    c_arr.extend_from_slice(&g1_to_bytes(nym));
    c_arr.extend_from_slice(&issuer_nonce.to_bytes_be());
    c_arr.extend_from_slice(&ipk.hash);

    hash_to_scalar::<CS>(&c_arr, &CS::dst(CS::CRED_REQUEST_DST))
}
