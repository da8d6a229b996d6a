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

//! Proof of possession of a [`Credential`] with selective disclosure.
//!
//! The prover rerandomizes the BBS+ signature `(A, B, e, s)` with `r1, r2` (`r3 = 1/r1`):
//! * `a_prime = A * r1`
//! * `a_bar = B * r1 - a_prime * e`
//! * `b_prime = B * r1 - h_rand * r2`
//! * `s_prime = s - r2 * r3`
//!
//! and proves in one Fiat-Shamir challenge `c` the relations
//! * `a_bar - b_prime = a_prime * (-e) + h_rand * r2`
//! * `b_prime * r3 = g1 + sum_disclosed(h_i * m_i) + h_sk * sk + h_rand * s_prime + sum_hidden(h_j * m_j)`
//! * `nym = h_sk * sk + h_rand * r_nym`
//!
//! Every response is `blind + c * witness` (the witnesses for `e` and `r3` enter negated).
//! A verifier additionally checks `e(a_prime, w) == e(a_bar, g2)`.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ciphersuites::IdemixCiphersuite;
use super::credential::Credential;
use super::keys::{IssuerPublicKey, UserSecretKey};
use super::pseudonym::{bind_nonce, Pseudonym};
use crate::errors::Error;
use crate::utils::encoding::{g1_to_bytes, put_u32, ByteReader, ScalarExt};
use crate::utils::message::Attribute;
use crate::utils::random::{random_nonzero_scalar, random_scalar, random_scalars};
use crate::utils::util::idemix_utils::{
    check_disclosure, g1, g2, hash_to_scalar, hidden_indices, mul2, pairing_equals, G1Projective, Scalar,
};

const SIGNATURE_LABEL: &[u8] = b"sign";

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Signature {
    pub a_prime: G1Projective,
    pub a_bar: G1Projective,
    pub b_prime: G1Projective,
    pub proof_c: Scalar,
    pub proof_s_sk: Scalar,
    pub proof_s_e: Scalar,
    pub proof_s_r2: Scalar,
    pub proof_s_r3: Scalar,
    pub proof_s_s_prime: Scalar,
    pub proof_s_r_nym: Scalar,
    /// One response per hidden attribute, in attribute order.
    pub proof_s_attrs: Vec<Scalar>,
    pub nonce: Scalar,
    pub nym: G1Projective,
}

struct Commitments {
    t1: G1Projective,
    t2: G1Projective,
    t3: G1Projective,
}

impl Signature {
    /// Presents `credential` under `pseudonym`, revealing the attributes whose mask entry is 1.
    ///
    /// # Arguments
    ///
    /// * `credential` - A completed credential.
    /// * `sk` - The user secret key the credential was issued to.
    /// * `pseudonym` - The pseudonym the presentation is bound to.
    /// * `ipk` - The issuer public key.
    /// * `disclosure` - One entry per attribute, 1 to disclose and 0 to hide.
    /// * `msg` - The message signed by the presentation.
    /// * `rng` - Source of randomness for the rerandomization, the blindings and the nonce.
    ///
    /// # Returns
    ///
    /// * The `Signature`, or `InvalidDisclosure` for a malformed mask.
    #[allow(clippy::too_many_arguments)]
    pub fn present<CS, R>(
        credential: &Credential,
        sk: &UserSecretKey,
        pseudonym: &Pseudonym,
        ipk: &IssuerPublicKey,
        disclosure: &[u8],
        msg: &[u8],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        let attribute_count = ipk.attribute_count();
        if credential.attrs.len() != attribute_count || ipk.h_attrs.len() != attribute_count {
            return Err(Error::AttributeCountMismatch { expected: attribute_count, actual: credential.attrs.len() });
        }
        check_disclosure(disclosure, attribute_count)?;

        let hidden = hidden_indices(disclosure);

        // rerandomize the credential
        let r1 = random_nonzero_scalar(rng);
        let r2 = random_scalar(rng);
        let r3 = Option::<Scalar>::from(r1.invert())
            .ok_or_else(|| Error::SignatureGenerationError("r1 not invertible".to_owned()))?;

        let a_prime = credential.a * r1;
        let b_r1 = credential.b * r1;
        let a_bar = b_r1 - a_prime * credential.e;
        let b_prime = b_r1 - ipk.h_rand * r2;
        let s_prime = credential.s - r2 * r3;

        if bool::from(a_prime.is_identity()) {
            return Err(Error::G1IdentityError);
        }

        // blinding factors
        let r_sk = random_scalar(rng);
        let r_e = random_scalar(rng);
        let r_r2 = random_scalar(rng);
        let r_r3 = random_scalar(rng);
        let r_s_prime = random_scalar(rng);
        let r_r_nym = random_scalar(rng);
        let r_attrs = random_scalars(hidden.len(), rng);

        let mut t2 = ipk.h_sk * r_sk + mul2(&b_prime, &r_r3, &ipk.h_rand, &r_s_prime);
        for (j, &i) in hidden.iter().enumerate() {
            t2 += ipk.h_attrs[i] * r_attrs[j];
        }
        let commitments = Commitments {
            t1: mul2(&a_prime, &r_e, &ipk.h_rand, &r_r2),
            t2,
            t3: mul2(&ipk.h_sk, &r_sk, &ipk.h_rand, &r_r_nym),
        };

        let nonce = random_scalar(rng);
        let proof_c = signature_challenge::<CS>(
            &commitments,
            &a_prime,
            &a_bar,
            &b_prime,
            &pseudonym.nym,
            ipk,
            disclosure,
            msg,
            &nonce,
        )?;

        let proof_s_attrs = hidden
            .iter()
            .zip(r_attrs.iter())
            .map(|(&i, r)| r + proof_c * credential.attrs[i].value)
            .collect();

        Ok(Self {
            a_prime,
            a_bar,
            b_prime,
            proof_c,
            proof_s_sk: r_sk + proof_c * sk.0,
            proof_s_e: r_e - proof_c * credential.e,
            proof_s_r2: r_r2 + proof_c * r2,
            proof_s_r3: r_r3 - proof_c * r3,
            proof_s_s_prime: r_s_prime + proof_c * s_prime,
            proof_s_r_nym: r_r_nym + proof_c * pseudonym.rand_nym,
            proof_s_attrs,
            nonce,
            nym: pseudonym.nym,
        })
    }

    /// Verifies the presentation.
    ///
    /// # Arguments
    ///
    /// * `disclosure` - The mask the presentation was made with.
    /// * `ipk` - The issuer public key.
    /// * `msg` - The signed message.
    /// * `attribute_values` - One slot per issuer attribute; only the slots disclosed by the mask
    ///   are read and they must be `Some`.
    ///
    /// # Returns
    ///
    /// * `true` if the pairing check and the proof of knowledge both hold.
    pub fn verify<CS: IdemixCiphersuite>(
        &self,
        disclosure: &[u8],
        ipk: &IssuerPublicKey,
        msg: &[u8],
        attribute_values: &[Option<Attribute>],
    ) -> bool {
        let attribute_count = ipk.attribute_count();
        if ipk.h_attrs.len() != attribute_count || attribute_values.len() != attribute_count {
            log::debug!("signature: attribute count does not match the issuer key");
            return false;
        }
        if let Err(e) = check_disclosure(disclosure, attribute_count) {
            log::debug!("signature: {}", e);
            return false;
        }

        let hidden = hidden_indices(disclosure);
        if self.proof_s_attrs.len() != hidden.len() {
            log::debug!("signature: {} attribute responses for {} hidden attributes", self.proof_s_attrs.len(), hidden.len());
            return false;
        }
        if bool::from(self.a_prime.is_identity()) {
            log::debug!("signature: a_prime is the identity");
            return false;
        }

        // e(a_prime, w) == e(a_bar, g2)
        if !pairing_equals(&self.a_prime, &ipk.w, &self.a_bar, &g2()) {
            log::debug!("signature: invalid rerandomized BBS+ signature");
            return false;
        }

        let c = self.proof_c;

        let t1 = mul2(&self.a_prime, &self.proof_s_e, &ipk.h_rand, &self.proof_s_r2) - (self.a_bar - self.b_prime) * c;

        let mut disclosed_sum = g1();
        for (i, d) in disclosure.iter().enumerate() {
            if *d == 1 {
                match attribute_values[i] {
                    Some(attr) => disclosed_sum += ipk.h_attrs[i] * attr.value,
                    None => {
                        log::debug!("signature: missing value for disclosed attribute {}", i);
                        return false;
                    }
                }
            }
        }
        let mut t2 = ipk.h_sk * self.proof_s_sk
            + mul2(&self.b_prime, &self.proof_s_r3, &ipk.h_rand, &self.proof_s_s_prime)
            + disclosed_sum * c;
        for (j, &i) in hidden.iter().enumerate() {
            t2 += ipk.h_attrs[i] * self.proof_s_attrs[j];
        }

        let t3 = mul2(&ipk.h_sk, &self.proof_s_sk, &ipk.h_rand, &self.proof_s_r_nym) - self.nym * c;

        let commitments = Commitments { t1, t2, t3 };
        match signature_challenge::<CS>(
            &commitments,
            &self.a_prime,
            &self.a_bar,
            &self.b_prime,
            &self.nym,
            ipk,
            disclosure,
            msg,
            &self.nonce,
        ) {
            Ok(expected) if expected == c => true,
            _ => {
                log::debug!("signature: challenge mismatch");
                false
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&g1_to_bytes(&self.a_prime));
        bytes.extend_from_slice(&g1_to_bytes(&self.a_bar));
        bytes.extend_from_slice(&g1_to_bytes(&self.b_prime));
        bytes.extend_from_slice(&self.proof_c.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_sk.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_e.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_r2.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_r3.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_s_prime.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s_r_nym.to_bytes_be());
        put_u32(&mut bytes, self.proof_s_attrs.len())?;
        self.proof_s_attrs.iter().for_each(|s| bytes.extend_from_slice(&s.to_bytes_be()));
        bytes.extend_from_slice(&self.nonce.to_bytes_be());
        bytes.extend_from_slice(&g1_to_bytes(&self.nym));
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(bytes);
        let signature = Self {
            a_prime: reader.g1()?,
            a_bar: reader.g1()?,
            b_prime: reader.g1()?,
            proof_c: reader.scalar()?,
            proof_s_sk: reader.scalar()?,
            proof_s_e: reader.scalar()?,
            proof_s_r2: reader.scalar()?,
            proof_s_r3: reader.scalar()?,
            proof_s_s_prime: reader.scalar()?,
            proof_s_r_nym: reader.scalar()?,
            proof_s_attrs: reader.scalars()?,
            nonce: reader.scalar()?,
            nym: reader.g1()?,
        };
        reader.finish()?;
        Ok(signature)
    }
}

#[allow(clippy::too_many_arguments)]
fn signature_challenge<CS: IdemixCiphersuite>(
    commitments: &Commitments,
    a_prime: &G1Projective,
    a_bar: &G1Projective,
    b_prime: &G1Projective,
    nym: &G1Projective,
    ipk: &IssuerPublicKey,
    disclosure: &[u8],
    msg: &[u8],
    nonce: &Scalar,
) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(SIGNATURE_LABEL);
    c_arr.extend_from_slice(&g1_to_bytes(&commitments.t1));
    c_arr.extend_from_slice(&g1_to_bytes(&commitments.t2));
    c_arr.extend_from_slice(&g1_to_bytes(&commitments.t3));
    c_arr.extend_from_slice(&g1_to_bytes(a_prime));
    c_arr.extend_from_slice(&g1_to_bytes(a_bar));
    c_arr.extend_from_slice(&g1_to_bytes(b_prime));
    c_arr.extend_from_slice(&g1_to_bytes(nym));
    c_arr.extend_from_slice(&ipk.hash);
    c_arr.extend_from_slice(disclosure);
    c_arr.extend_from_slice(msg);

    let c = hash_to_scalar::<CS>(&c_arr, &CS::dst(CS::SIGNATURE_DST))?;
    bind_nonce::<CS>(&c, nonce)
}
