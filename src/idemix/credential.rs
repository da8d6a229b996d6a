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
use super::cred_request::{BlindFactor, CredentialRequest};
use super::keys::{IssuerPublicKey, UserSecretKey};
use crate::errors::Error;
use crate::keys::pair::IssuerKeyPair;
use crate::utils::encoding::{g1_to_bytes, put_u32, ByteReader, ScalarExt};
use crate::utils::message::Attribute;
use crate::utils::random::random_scalar;
use crate::utils::util::idemix_utils::{g1, g2, multi_mul, pairing_equals, G1Projective, Scalar};

/// BBS+ signature over the user's nym and the attribute values, as it leaves the issuer.
///
/// `b = g1 + nym + h_rand * s + sum(h_attrs[i] * attrs[i])` and `a = b * 1/(isk + e)`.
/// The holder turns it into a usable [`Credential`] with [`IssuedCredential::complete`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssuedCredential {
    pub(crate) a: G1Projective,
    pub(crate) b: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
    pub(crate) attrs: Vec<Attribute>,
}

/// A completed credential. `s` now includes the request blinding factor and is known only to
/// the holder.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Credential {
    pub(crate) a: G1Projective,
    pub(crate) b: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
    pub(crate) attrs: Vec<Attribute>,
}

impl IssuedCredential {
    /// Issuer side: blind-signs the request nym together with `attribute_values`.
    ///
    /// The request proof is checked first; the caller is responsible for having handed out
    /// `request.issuer_nonce` for this request only.
    ///
    /// # Arguments
    ///
    /// * `issuer_keypair` - The issuer key pair.
    /// * `request` - The user's credential request.
    /// * `attribute_values` - One value per attribute name of the issuer key, in order.
    /// * `rng` - Source of randomness for `e` and `s`.
    ///
    /// # Returns
    ///
    /// * The `IssuedCredential`, or `AttributeCountMismatch`, `InvalidCredentialRequest`,
    ///   `DegenerateKeyError` or `G1IdentityError`.
    pub fn issue<CS, R>(
        issuer_keypair: &IssuerKeyPair,
        request: &CredentialRequest,
        attribute_values: &[Attribute],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        let ipk = issuer_keypair.public_key();
        let isk = &issuer_keypair.private_key().0;

        if attribute_values.len() != ipk.attribute_count() {
            return Err(Error::AttributeCountMismatch {
                expected: ipk.attribute_count(),
                actual: attribute_values.len(),
            });
        }
        if !request.check::<CS>(ipk) {
            return Err(Error::InvalidCredentialRequest);
        }

        let e = random_scalar(rng);
        let s = random_scalar(rng);

        let b = g1() + request.nym + ipk.h_rand * s + multi_mul(&ipk.h_attrs, &Attribute::values(attribute_values));

        let exp = Option::<Scalar>::from((isk + e).invert()).ok_or(Error::DegenerateKeyError)?;
        let a = b * exp;

        if bool::from(a.is_identity()) {
            return Err(Error::G1IdentityError);
        }

        Ok(Self { a, b, e, s, attrs: attribute_values.to_vec() })
    }

    /// User side: folds the request blinding factor into `s`. Consumes the issued value, so a
    /// credential can only be completed once.
    pub fn complete(self, cred_s1: &BlindFactor) -> Credential {
        Credential { a: self.a, b: self.b, e: self.e, s: self.s + cred_s1.0, attrs: self.attrs }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        encode_parts(&self.a, &self.b, &self.e, &self.s, &self.attrs)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (a, b, e, s, attrs) = decode_parts(bytes)?;
        Ok(Self { a, b, e, s, attrs })
    }
}

impl Credential {
    /// Holder side check: the credential opens to `sk` and carries a valid BBS+ signature.
    ///
    /// # Arguments
    ///
    /// * `sk` - The user secret key the request nym committed to.
    /// * `ipk` - The issuer public key.
    ///
    /// # Returns
    ///
    /// * `true` if `B` opens to `sk`, `s` and the attributes and `e(A, g2^e * W) == e(B, g2)`.
    pub fn ver(&self, sk: &UserSecretKey, ipk: &IssuerPublicKey) -> bool {
        if self.attrs.len() != ipk.attribute_count() || ipk.h_attrs.len() != ipk.attribute_count() {
            log::debug!("credential: attribute count does not match the issuer key");
            return false;
        }
        if bool::from(self.a.is_identity()) {
            log::debug!("credential: A is the identity");
            return false;
        }

        let b = g1() + ipk.h_sk * sk.0 + ipk.h_rand * self.s + multi_mul(&ipk.h_attrs, &Attribute::values(&self.attrs));
        if b != self.b {
            log::debug!("credential: B does not open to the attributes");
            return false;
        }

        // e(A, g2^E * W) == e(B, g2)
        if !pairing_equals(&self.a, &(g2() * self.e + ipk.w), &self.b, &g2()) {
            log::debug!("credential: invalid BBS+ signature");
            return false;
        }
        true
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        encode_parts(&self.a, &self.b, &self.e, &self.s, &self.attrs)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (a, b, e, s, attrs) = decode_parts(bytes)?;
        Ok(Self { a, b, e, s, attrs })
    }
}

fn encode_parts(a: &G1Projective, b: &G1Projective, e: &Scalar, s: &Scalar, attrs: &[Attribute]) -> Result<Vec<u8>, Error> {
    let mut bytes: Vec<u8> = Vec::new();
    bytes.extend_from_slice(&g1_to_bytes(a));
    bytes.extend_from_slice(&g1_to_bytes(b));
    bytes.extend_from_slice(&e.to_bytes_be());
    bytes.extend_from_slice(&s.to_bytes_be());
    put_u32(&mut bytes, attrs.len())?;
    attrs.iter().for_each(|m| bytes.extend_from_slice(&m.to_bytes()));
    Ok(bytes)
}

fn decode_parts(bytes: &[u8]) -> Result<(G1Projective, G1Projective, Scalar, Scalar, Vec<Attribute>), Error> {
    let mut reader = ByteReader::new(bytes);
    let a = reader.g1()?;
    let b = reader.g1()?;
    let e = reader.scalar()?;
    let s = reader.scalar()?;
    let attrs = reader.scalars()?.into_iter().map(Attribute::new).collect();
    reader.finish()?;
    Ok((a, b, e, s, attrs))
}
