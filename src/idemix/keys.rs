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

use std::collections::HashSet;
use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ciphersuites::IdemixCiphersuite;
use crate::errors::Error;
use crate::keys::key::{PrivateKey, PublicKey};
use crate::keys::pair::IssuerKeyPair;
use crate::utils::encoding::{g1_to_bytes, g2_to_bytes, put_u32, ByteReader, ScalarExt, G1_BYTES, SCALAR_BYTES};
use crate::utils::random::{random_nonzero_scalar, random_scalar};
use crate::utils::util::idemix_utils::{g2, hash_to_scalar, random_generator, G1Projective, G2Projective, Scalar};

/// Issuer public key.
///
/// `w = g2 * isk` and `bar_g2 = bar_g1 * isk`; `(proof_c, proof_s)` shows both share the same
/// exponent. `hash` commits to the whole key and binds every proof made against it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "IssuerPublicKeyFields")]
pub struct IssuerPublicKey {
    pub attribute_names: Vec<String>,
    pub h_sk: G1Projective,
    pub h_rand: G1Projective,
    pub h_attrs: Vec<G1Projective>,
    pub w: G2Projective,
    pub bar_g1: G1Projective,
    pub bar_g2: G1Projective,
    pub proof_c: Scalar,
    pub proof_s: Scalar,
    pub hash: Vec<u8>,
}

/// Deserialized form of [`IssuerPublicKey`], shape checked before it becomes a key.
#[derive(Deserialize)]
struct IssuerPublicKeyFields {
    attribute_names: Vec<String>,
    h_sk: G1Projective,
    h_rand: G1Projective,
    h_attrs: Vec<G1Projective>,
    w: G2Projective,
    bar_g1: G1Projective,
    bar_g2: G1Projective,
    proof_c: Scalar,
    proof_s: Scalar,
    hash: Vec<u8>,
}

impl TryFrom<IssuerPublicKeyFields> for IssuerPublicKey {
    type Error = Error;

    fn try_from(f: IssuerPublicKeyFields) -> Result<Self, Self::Error> {
        let ipk = Self {
            attribute_names: f.attribute_names,
            h_sk: f.h_sk,
            h_rand: f.h_rand,
            h_attrs: f.h_attrs,
            w: f.w,
            bar_g1: f.bar_g1,
            bar_g2: f.bar_g2,
            proof_c: f.proof_c,
            proof_s: f.proof_s,
            hash: f.hash,
        };
        ipk.validate_shape()?;
        Ok(ipk)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssuerSecretKey(pub(crate) Scalar);

/// The user's long-term secret, committed to in every nym.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UserSecretKey(pub(crate) Scalar);

impl IssuerKeyPair {
    /// Creates a fresh issuer key for the given ordered attribute names.
    ///
    /// # Arguments
    ///
    /// * `attribute_names` - The attribute names, in the order credentials will carry them.
    /// * `rng` - Source of randomness for the secret, the generators and the key proof.
    ///
    /// # Returns
    ///
    /// * The key pair, or `DuplicateAttributeError` if a name repeats.
    pub fn generate<CS, R>(attribute_names: &[&str], rng: &mut R) -> Result<Self, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        check_unique_names(attribute_names.iter().copied())?;

        let isk = random_nonzero_scalar(rng);
        let w = g2() * isk;

        let h_sk = random_generator::<CS, R>(rng)?;
        let h_rand = random_generator::<CS, R>(rng)?;
        let h_attrs = attribute_names
            .iter()
            .map(|_| random_generator::<CS, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;

        let bar_g1 = random_generator::<CS, R>(rng)?;
        let bar_g2 = bar_g1 * isk;

        // equality of discrete logs: w = g2^isk and bar_g2 = bar_g1^isk
        let r = random_scalar(rng);
        let t1 = g2() * r;
        let t2 = bar_g1 * r;
        let proof_c = key_proof_challenge::<CS>(&t1, &t2, &bar_g1, &w, &bar_g2)?;
        let proof_s = proof_c * isk + r;

        let mut ipk = IssuerPublicKey {
            attribute_names: attribute_names.iter().map(|n| (*n).to_owned()).collect(),
            h_sk,
            h_rand,
            h_attrs,
            w,
            bar_g1,
            bar_g2,
            proof_c,
            proof_s,
            hash: Vec::new(),
        };
        ipk.hash = ipk.compute_hash::<CS>()?;

        Ok(Self { public: ipk, private: IssuerSecretKey(isk) })
    }
}

fn check_unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::DuplicateAttributeError(name.to_owned()));
        }
    }
    Ok(())
}

fn key_proof_challenge<CS: IdemixCiphersuite>(
    t1: &G2Projective,
    t2: &G1Projective,
    bar_g1: &G1Projective,
    w: &G2Projective,
    bar_g2: &G1Projective,
) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&g2_to_bytes(t1));
    c_arr.extend_from_slice(&g1_to_bytes(t2));
    c_arr.extend_from_slice(&g2_to_bytes(&g2()));
    c_arr.extend_from_slice(&g1_to_bytes(bar_g1));
    c_arr.extend_from_slice(&g2_to_bytes(w));
    c_arr.extend_from_slice(&g1_to_bytes(bar_g2));

    hash_to_scalar::<CS>(&c_arr, &CS::dst(CS::IPK_PROOF_DST))
}

impl IssuerPublicKey {
    pub fn attribute_count(&self) -> usize {
        self.attribute_names.len()
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attribute_names.iter().position(|n| n == name)
    }

    /// Checks the structure of the key: unique attribute names and one generator per name.
    ///
    /// # Returns
    ///
    /// * `Err(DuplicateAttributeError)` for a repeated name, `Err(AttributeCountMismatch)` when
    ///   `h_attrs` and `attribute_names` differ in length.
    pub fn validate_shape(&self) -> Result<(), Error> {
        check_unique_names(self.attribute_names.iter().map(String::as_str))?;
        if self.h_attrs.len() != self.attribute_names.len() {
            return Err(Error::AttributeCountMismatch {
                expected: self.attribute_names.len(),
                actual: self.h_attrs.len(),
            });
        }
        Ok(())
    }

    /// Verifies that the key is well formed: shape, the proof that `w` and `bar_g2` share the
    /// issuer secret, and the self hash.
    ///
    /// # Returns
    ///
    /// * `true` if every check holds, `false` otherwise. The failing check is logged at debug level.
    pub fn check<CS: IdemixCiphersuite>(&self) -> bool {
        if let Err(e) = self.validate_shape() {
            log::debug!("ipk: {}", e);
            return false;
        }
        if bool::from(self.bar_g1.is_identity())
            || bool::from(self.w.is_identity())
            || bool::from(self.h_sk.is_identity())
            || bool::from(self.h_rand.is_identity())
        {
            log::debug!("ipk: identity element in key");
            return false;
        }

        let t1 = g2() * self.proof_s - self.w * self.proof_c;
        let t2 = self.bar_g1 * self.proof_s - self.bar_g2 * self.proof_c;
        match key_proof_challenge::<CS>(&t1, &t2, &self.bar_g1, &self.w, &self.bar_g2) {
            Ok(c) if c == self.proof_c => {}
            _ => {
                log::debug!("ipk: invalid proof of well-formedness");
                return false;
            }
        }

        match self.compute_hash::<CS>() {
            Ok(hash) if hash == self.hash => true,
            _ => {
                log::debug!("ipk: hash mismatch");
                false
            }
        }
    }

    fn compute_hash<CS: IdemixCiphersuite>(&self) -> Result<Vec<u8>, Error> {
        let digest = hash_to_scalar::<CS>(&self.encode_with_hash(&[])?, &CS::dst(CS::IPK_HASH_DST))?;
        Ok(digest.to_bytes_be().to_vec())
    }

    fn encode_with_hash(&self, hash: &[u8]) -> Result<Vec<u8>, Error> {
        let mut bytes: Vec<u8> = Vec::new();
        put_u32(&mut bytes, self.attribute_names.len())?;
        for name in &self.attribute_names {
            put_u32(&mut bytes, name.len())?;
            bytes.extend_from_slice(name.as_bytes());
        }
        bytes.extend_from_slice(&g1_to_bytes(&self.h_sk));
        bytes.extend_from_slice(&g1_to_bytes(&self.h_rand));
        put_u32(&mut bytes, self.h_attrs.len())?;
        self.h_attrs.iter().for_each(|h| bytes.extend_from_slice(&g1_to_bytes(h)));
        bytes.extend_from_slice(&g2_to_bytes(&self.w));
        bytes.extend_from_slice(&g1_to_bytes(&self.bar_g1));
        bytes.extend_from_slice(&g1_to_bytes(&self.bar_g2));
        bytes.extend_from_slice(&self.proof_c.to_bytes_be());
        bytes.extend_from_slice(&self.proof_s.to_bytes_be());
        put_u32(&mut bytes, hash.len())?;
        bytes.extend_from_slice(hash);
        Ok(bytes)
    }

    /// Serializes the key. Names, generators and the hash are prefixed with u32 big-endian counts.
    ///
    /// # Returns
    ///
    /// * The encoded key, or `SerializationError` if a count does not fit in a u32.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.encode_with_hash(&self.hash)
    }

    /// Decodes a key produced by [`IssuerPublicKey::to_bytes`].
    ///
    /// # Arguments
    ///
    /// * `bytes` - The encoded key.
    ///
    /// # Returns
    ///
    /// * The key, `DeserializationError` for malformed bytes, or the error of
    ///   [`IssuerPublicKey::validate_shape`] for a key with an invalid structure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(bytes);

        let names_len = reader.count(4)?;
        let mut attribute_names = Vec::with_capacity(names_len);
        for _ in 0..names_len {
            let len = reader.u32()?;
            let name = String::from_utf8(reader.take(len)?.to_vec())
                .map_err(|_| Error::DeserializationError("attribute name is not utf-8".to_owned()))?;
            attribute_names.push(name);
        }

        let h_sk = reader.g1()?;
        let h_rand = reader.g1()?;
        let h_attrs_len = reader.count(G1_BYTES)?;
        let h_attrs = (0..h_attrs_len).map(|_| reader.g1()).collect::<Result<Vec<_>, _>>()?;
        let w = reader.g2()?;
        let bar_g1 = reader.g1()?;
        let bar_g2 = reader.g1()?;
        let proof_c = reader.scalar()?;
        let proof_s = reader.scalar()?;
        let hash_len = reader.count(1)?;
        let hash = reader.take(hash_len)?.to_vec();
        reader.finish()?;

        let ipk = Self { attribute_names, h_sk, h_rand, h_attrs, w, bar_g1, bar_g2, proof_c, proof_s, hash };
        ipk.validate_shape()?;
        Ok(ipk)
    }
}

impl PublicKey for IssuerPublicKey {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.to_bytes()
    }
}

impl IssuerSecretKey {
    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0.to_bytes_be()
    }

    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error> {
        Ok(Self(Scalar::from_bytes_be(bytes)?))
    }
}

impl PrivateKey for IssuerSecretKey {
    type Output = [u8; SCALAR_BYTES];
    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }
}

impl UserSecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(random_nonzero_scalar(rng))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0.to_bytes_be()
    }

    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error> {
        Ok(Self(Scalar::from_bytes_be(bytes)?))
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes: [u8; SCALAR_BYTES] = hex::decode(hex)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::DeserializationError("invalid user secret key hex".to_owned()))?;
        Self::from_bytes(&bytes)
    }
}

impl PrivateKey for UserSecretKey {
    type Output = [u8; SCALAR_BYTES];
    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }
}

impl fmt::Display for IssuerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerPublicKey({:?}, {})", self.attribute_names, hex::encode(&self.hash))
    }
}
