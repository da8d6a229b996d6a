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

/// Thin layer over the pairing engine. Protocol code only reaches `bls12_381_plus`
/// arithmetic through the types re-exported here and the helpers below.
pub mod idemix_utils {
    use bls12_381_plus::{multi_miller_loop, G2Prepared};
    use group::{Curve, Group};
    use elliptic_curve::hash2curve::{ExpandMsg, Expander};
    use rand::{CryptoRng, RngCore};

    pub use bls12_381_plus::{G1Projective, G2Projective, Scalar};

    use crate::errors::Error;
    use crate::idemix::ciphersuites::{IdemixCiphersuite, EXPAND_LEN};
    use crate::utils::random::random_bytes;

    const GENERATOR_SEED_LEN: usize = 32;

    /// Base point of G1.
    pub fn g1() -> G1Projective {
        G1Projective::GENERATOR
    }

    /// Base point of G2.
    pub fn g2() -> G2Projective {
        G2Projective::GENERATOR
    }

    /// Hashes `msg_octets` to a scalar mod q under the domain separation tag `dst`.
    pub fn hash_to_scalar<CS: IdemixCiphersuite>(msg_octets: &[u8], dst: &[u8]) -> Result<Scalar, Error> {
        let mut uniform_bytes = [0u8; EXPAND_LEN];
        CS::Expander::expand_message(&[msg_octets], &[dst], EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);

        Ok(Scalar::from_okm(&uniform_bytes))
    }

    /// Fresh G1 generator with unknown discrete log, obtained by hashing random seed bytes to the curve.
    pub fn random_generator<CS, R>(rng: &mut R) -> Result<G1Projective, Error>
    where
        CS: IdemixCiphersuite,
        R: RngCore + CryptoRng,
    {
        let seed = random_bytes(GENERATOR_SEED_LEN, rng);
        let dst = CS::dst(CS::GENERATOR_DST);
        let generator = G1Projective::hash::<CS::Expander>(&seed, &dst);

        if bool::from(generator.is_identity()) {
            return Err(Error::G1IdentityError);
        }
        Ok(generator)
    }

    /// P * a + Q * b
    pub fn mul2(p: &G1Projective, a: &Scalar, q: &G1Projective, b: &Scalar) -> G1Projective {
        p * a + q * b
    }

    /// Sum of `points[i] * scalars[i]`, accumulated two terms at a time.
    pub fn multi_mul(points: &[G1Projective], scalars: &[Scalar]) -> G1Projective {
        let mut acc = G1Projective::IDENTITY;
        let mut pairs = points.iter().zip(scalars.iter());
        while let Some((p, a)) = pairs.next() {
            match pairs.next() {
                Some((q, b)) => acc += mul2(p, a, q, b),
                None => acc += p * a,
            }
        }
        acc
    }

    /// e(p1, q1) == e(p2, q2)
    pub fn pairing_equals(p1: &G1Projective, q1: &G2Projective, p2: &G1Projective, q2: &G2Projective) -> bool {
        let q1 = G2Prepared::from(q1.to_affine());
        let q2 = G2Prepared::from(-q2.to_affine());

        let term1 = (&p1.to_affine(), &q1);
        let term2 = (&p2.to_affine(), &q2);

        multi_miller_loop(&[term1, term2]).final_exponentiation().is_identity().into()
    }

    /// Positions of the attributes a disclosure mask keeps hidden, densely packed.
    pub fn hidden_indices(disclosure: &[u8]) -> Vec<usize> {
        disclosure
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// A mask is well formed when it has one 0/1 entry per attribute.
    pub fn check_disclosure(disclosure: &[u8], attribute_count: usize) -> Result<(), Error> {
        if disclosure.len() != attribute_count {
            return Err(Error::InvalidDisclosure(format!(
                "mask has {} entries for {} attributes",
                disclosure.len(),
                attribute_count
            )));
        }
        if let Some(bad) = disclosure.iter().find(|&&d| d > 1) {
            return Err(Error::InvalidDisclosure(format!("mask entry {} is not 0 or 1", bad)));
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::idemix::ciphersuites::{Bls12381Sha256, Bls12381Shake256};
        use crate::utils::random::random_scalars;

        #[test]
        fn hidden_indices_are_dense_for_interleaved_masks() {
            assert_eq!(hidden_indices(&[1, 0, 1, 0]), vec![1, 3]);
            assert_eq!(hidden_indices(&[0, 1, 0, 1]), vec![0, 2]);
            assert_eq!(hidden_indices(&[1, 1, 1]), Vec::<usize>::new());
            assert_eq!(hidden_indices(&[0, 0]), vec![0, 1]);
        }

        #[test]
        fn disclosure_mask_shape() {
            assert!(check_disclosure(&[1, 0], 2).is_ok());
            assert!(matches!(check_disclosure(&[1, 0], 3), Err(Error::InvalidDisclosure(_))));
            assert!(matches!(check_disclosure(&[1, 2], 2), Err(Error::InvalidDisclosure(_))));
        }

        #[test]
        fn multi_mul_matches_naive_sum() {
            let mut rng = rand::thread_rng();
            for n in 0..5 {
                let points: Vec<G1Projective> = random_scalars(n, &mut rng).iter().map(|s| g1() * s).collect();
                let scalars = random_scalars(n, &mut rng);
                let naive = points
                    .iter()
                    .zip(scalars.iter())
                    .fold(G1Projective::IDENTITY, |acc, (p, s)| acc + p * s);
                assert_eq!(multi_mul(&points, &scalars), naive);
            }
        }

        #[test]
        fn hash_to_scalar_is_domain_separated() {
            let a = hash_to_scalar::<Bls12381Sha256>(b"msg", b"DST_A").unwrap();
            let b = hash_to_scalar::<Bls12381Sha256>(b"msg", b"DST_B").unwrap();
            let c = hash_to_scalar::<Bls12381Shake256>(b"msg", b"DST_A").unwrap();
            assert_eq!(a, hash_to_scalar::<Bls12381Sha256>(b"msg", b"DST_A").unwrap());
            assert_ne!(a, b);
            assert_ne!(a, c);
        }

        #[test]
        fn hash_to_scalar_reduces_expand_len_bytes() {
            let msg: &[u8] = b"msg";
            let dst: &[u8] = b"DST_A";
            let mut okm = [0u8; EXPAND_LEN];
            <Bls12381Shake256 as IdemixCiphersuite>::Expander::expand_message(&[msg], &[dst], EXPAND_LEN)
                .unwrap()
                .fill_bytes(&mut okm);
            assert_eq!(hash_to_scalar::<Bls12381Shake256>(msg, dst).unwrap(), Scalar::from_okm(&okm));
        }

        #[test]
        fn pairing_equals_detects_bilinearity() {
            let mut rng = rand::thread_rng();
            let x = crate::utils::random::random_nonzero_scalar(&mut rng);
            assert!(pairing_equals(&(g1() * x), &g2(), &g1(), &(g2() * x)));
            assert!(!pairing_equals(&(g1() * x), &g2(), &g1(), &g2()));
        }
    }
}
