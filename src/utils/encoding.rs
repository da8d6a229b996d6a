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

//! Canonical fixed-width encodings.
//!
//! These bytes feed every Fiat-Shamir transcript, so the layout must not change:
//! * scalar: `SCALAR_BYTES` big-endian
//! * G1: one format byte (`0x04`) followed by the uncompressed X and Y coordinates;
//!   the identity is `0x00` followed by zeros
//! * G2: the uncompressed X and Y coordinates (`4 * FIELD_BYTES`)

use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use group::Curve;

use crate::errors::Error;

/// Byte length of a base field element of BLS12-381.
pub const FIELD_BYTES: usize = 48;
pub const SCALAR_BYTES: usize = 32;
pub const G1_BYTES: usize = 2 * FIELD_BYTES + 1;
pub const G2_BYTES: usize = 4 * FIELD_BYTES;

const G1_FORMAT_POINT: u8 = 0x04;
const G1_FORMAT_INFINITY: u8 = 0x00;

pub trait ScalarExt: Sized {
    fn to_bytes_be(&self) -> [u8; SCALAR_BYTES];
    fn from_bytes_be(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error>;
}

impl ScalarExt for Scalar {
    fn to_bytes_be(&self) -> [u8; SCALAR_BYTES] {
        self.to_be_bytes()
    }

    fn from_bytes_be(bytes: &[u8; SCALAR_BYTES]) -> Result<Self, Error> {
        Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
            .ok_or_else(|| Error::DeserializationError("non canonical scalar".to_owned()))
    }
}

pub fn g1_to_bytes(p: &G1Projective) -> [u8; G1_BYTES] {
    let mut bytes = [0u8; G1_BYTES];
    if bool::from(p.is_identity()) {
        bytes[0] = G1_FORMAT_INFINITY;
        return bytes;
    }
    bytes[0] = G1_FORMAT_POINT;
    bytes[1..].copy_from_slice(&p.to_affine().to_uncompressed());
    bytes
}

pub fn g1_from_bytes(bytes: &[u8]) -> Result<G1Projective, Error> {
    if bytes.len() != G1_BYTES {
        return Err(Error::DeserializationError(format!("G1 point must be {} bytes", G1_BYTES)));
    }
    match bytes[0] {
        G1_FORMAT_INFINITY => {
            if bytes[1..].iter().any(|&b| b != 0) {
                return Err(Error::DeserializationError("malformed G1 identity".to_owned()));
            }
            Ok(G1Projective::IDENTITY)
        }
        G1_FORMAT_POINT => {
            let mut coordinates = [0u8; G1_BYTES - 1];
            coordinates.copy_from_slice(&bytes[1..]);
            let point = Option::<G1Affine>::from(G1Affine::from_uncompressed(&coordinates))
                .ok_or_else(|| Error::DeserializationError("invalid G1 point".to_owned()))?;
            if bool::from(point.is_identity()) {
                return Err(Error::DeserializationError("G1 identity with point format".to_owned()));
            }
            Ok(G1Projective::from(point))
        }
        other => Err(Error::DeserializationError(format!("unknown G1 format byte {:#04x}", other))),
    }
}

pub fn g2_to_bytes(p: &G2Projective) -> [u8; G2_BYTES] {
    p.to_affine().to_uncompressed()
}

pub fn g2_from_bytes(bytes: &[u8]) -> Result<G2Projective, Error> {
    let bytes: [u8; G2_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::DeserializationError(format!("G2 point must be {} bytes", G2_BYTES)))?;
    Option::<G2Affine>::from(G2Affine::from_uncompressed(&bytes))
        .map(G2Projective::from)
        .ok_or_else(|| Error::DeserializationError("invalid G2 point".to_owned()))
}

/// Appends a length or count as a u32 big-endian prefix.
pub(crate) fn put_u32(bytes: &mut Vec<u8>, value: usize) -> Result<(), Error> {
    let value = u32::try_from(value)
        .map_err(|_| Error::SerializationError(format!("length {} does not fit in a u32 prefix", value)))?;
    bytes.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Cursor over a composite encoding.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::DeserializationError("unexpected end of input".to_owned()))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u32(&mut self) -> Result<usize, Error> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf) as usize)
    }

    pub(crate) fn scalar(&mut self) -> Result<Scalar, Error> {
        let mut buf = [0u8; SCALAR_BYTES];
        buf.copy_from_slice(self.take(SCALAR_BYTES)?);
        Scalar::from_bytes_be(&buf)
    }

    pub(crate) fn g1(&mut self) -> Result<G1Projective, Error> {
        g1_from_bytes(self.take(G1_BYTES)?)
    }

    pub(crate) fn g2(&mut self) -> Result<G2Projective, Error> {
        g2_from_bytes(self.take(G2_BYTES)?)
    }

    /// Reads a u32 count, bounding it by what the remaining input could possibly hold.
    pub(crate) fn count(&mut self, item_len: usize) -> Result<usize, Error> {
        let count = self.u32()?;
        if count.saturating_mul(item_len) > self.bytes.len() - self.pos {
            return Err(Error::DeserializationError("count exceeds input".to_owned()));
        }
        Ok(count)
    }

    pub(crate) fn scalars(&mut self) -> Result<Vec<Scalar>, Error> {
        let count = self.count(SCALAR_BYTES)?;
        (0..count).map(|_| self.scalar()).collect()
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.pos != self.bytes.len() {
            return Err(Error::DeserializationError("trailing bytes".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::random_nonzero_scalar;
    use ff::Field;

    #[test]
    fn widths() {
        assert_eq!(G1_BYTES, 97);
        assert_eq!(G2_BYTES, 192);
        assert_eq!(Scalar::ONE.to_bytes_be().len(), SCALAR_BYTES);
    }

    #[test]
    fn scalar_is_big_endian() {
        let bytes = Scalar::from(258u64).to_bytes_be();
        assert_eq!(&bytes[30..], &[1, 2]);
        assert!(bytes[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn scalar_rejects_values_above_order() {
        assert!(Scalar::from_bytes_be(&[0xff; SCALAR_BYTES]).is_err());
    }

    #[test]
    fn g1_identity_has_reserved_encoding() {
        let bytes = g1_to_bytes(&G1Projective::IDENTITY);
        assert!(bytes.iter().all(|&b| b == 0));
        assert_eq!(g1_from_bytes(&bytes).unwrap(), G1Projective::IDENTITY);
    }

    #[test]
    fn g1_point_encoding() {
        let mut rng = rand::thread_rng();
        let p = G1Projective::GENERATOR * random_nonzero_scalar(&mut rng);
        let bytes = g1_to_bytes(&p);
        assert_eq!(bytes[0], 0x04);
        assert_eq!(g1_from_bytes(&bytes).unwrap(), p);

        let mut wrong_format = bytes;
        wrong_format[0] = 0x05;
        assert!(g1_from_bytes(&wrong_format).is_err());

        let mut off_curve = bytes;
        off_curve[G1_BYTES - 1] ^= 0x01;
        assert!(g1_from_bytes(&off_curve).is_err());

        assert!(g1_from_bytes(&bytes[..G1_BYTES - 1]).is_err());
    }

    #[test]
    fn g2_point_encoding() {
        let mut rng = rand::thread_rng();
        let p = G2Projective::GENERATOR * random_nonzero_scalar(&mut rng);
        let bytes = g2_to_bytes(&p);
        assert_eq!(g2_from_bytes(&bytes).unwrap(), p);
        assert!(g2_from_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn reader_rejects_truncated_and_trailing_input() {
        let mut bytes = Vec::new();
        put_u32(&mut bytes, 2).unwrap();
        bytes.extend_from_slice(&Scalar::ONE.to_bytes_be());

        let mut reader = ByteReader::new(&bytes);
        assert!(reader.scalars().is_err());

        bytes.extend_from_slice(&Scalar::ONE.to_bytes_be());
        bytes.push(0);
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.scalars().unwrap(), vec![Scalar::ONE, Scalar::ONE]);
        assert!(reader.finish().is_err());
    }

    #[test]
    fn u32_prefix_rejects_oversized_lengths() {
        let mut bytes = Vec::new();
        put_u32(&mut bytes, 258).unwrap();
        assert_eq!(bytes, vec![0, 0, 1, 2]);

        if let Ok(too_long) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert!(matches!(put_u32(&mut bytes, too_long), Err(Error::SerializationError(_))));
            assert_eq!(bytes.len(), 4);
        }
    }
}
