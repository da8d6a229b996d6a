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

/// Uniform scalar in [0, q).
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(&mut *rng)
}

/// Uniform scalar in [1, q).
pub fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let s = Scalar::random(&mut *rng);
        if !bool::from(s.is_zero()) {
            return s;
        }
    }
}

pub fn random_scalars<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<Scalar> {
    (0..count).map(|_| random_scalar(rng)).collect()
}

pub fn random_bytes<R: RngCore + CryptoRng>(len: usize, rng: &mut R) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}
