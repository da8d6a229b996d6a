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

use core::marker::PhantomData;
use crate::idemix::ciphersuites::{Bls12381Sha256, Bls12381Shake256, IdemixCiphersuite};

/// Idemix over BLS12-381 with the hash configuration `CS`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Idemix<CS: IdemixCiphersuite>(PhantomData<CS>);

pub trait Scheme: Eq + 'static + Sized {
    type Ciphersuite: IdemixCiphersuite;
}

impl<CS: IdemixCiphersuite> Scheme for Idemix<CS> {
    type Ciphersuite = CS;
}

pub type IdemixBls12381Sha256 = Idemix<Bls12381Sha256>;
pub type IdemixBls12381Shake256 = Idemix<Bls12381Shake256>;
