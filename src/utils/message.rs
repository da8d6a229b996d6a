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

use bls12_381_plus::Scalar;
use ff::Field;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::idemix::ciphersuites::IdemixCiphersuite;
use crate::utils::encoding::{ScalarExt, SCALAR_BYTES};
use crate::utils::util::idemix_utils::hash_to_scalar;

const MAP_ATTRIBUTE_DST: &[u8] = b"MAP_ATTRIBUTE_TO_SCALAR_AS_HASH_";

/// A credential attribute value, as the scalar the issuer signs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub value: Scalar,
}

impl Attribute {
    pub fn new(value: Scalar) -> Self {
        Self { value }
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(Scalar::from(value))
    }

    /// Maps arbitrary attribute data (e.g. a country code) to a scalar.
    pub fn from_bytes_as_hash<CS: IdemixCiphersuite>(data: &[u8]) -> Result<Self, Error> {
        let dst = CS::dst(MAP_ATTRIBUTE_DST);
        Ok(Self::new(hash_to_scalar::<CS>(data, &dst)?))
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::new(Scalar::random(&mut *rng))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.value.to_bytes_be()
    }

    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error> {
        Ok(Self::new(Scalar::from_bytes_be(bytes)?))
    }

    pub(crate) fn values(attributes: &[Attribute]) -> Vec<Scalar> {
        attributes.iter().map(|a| a.value).collect()
    }
}

impl From<u64> for Attribute {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idemix::ciphersuites::Bls12381Sha256;

    #[test]
    fn hashed_attributes_are_deterministic() {
        let us = Attribute::from_bytes_as_hash::<Bls12381Sha256>(b"US").unwrap();
        let it = Attribute::from_bytes_as_hash::<Bls12381Sha256>(b"IT").unwrap();
        assert_eq!(us, Attribute::from_bytes_as_hash::<Bls12381Sha256>(b"US").unwrap());
        assert_ne!(us, it);
    }

    #[test]
    fn fixed_width_bytes() {
        let age = Attribute::from(25u64);
        let bytes = age.to_bytes();
        assert_eq!(bytes[SCALAR_BYTES - 1], 25);
        assert_eq!(Attribute::from_bytes(&bytes).unwrap(), age);
    }
}
