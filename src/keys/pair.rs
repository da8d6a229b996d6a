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

use serde::{Deserialize, Serialize};

use crate::idemix::keys::{IssuerPublicKey, IssuerSecretKey};

/// Issuer key material. The secret half never appears in the public key encoding.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssuerKeyPair {
    pub(crate) public: IssuerPublicKey,
    pub(crate) private: IssuerSecretKey,
}

impl IssuerKeyPair {
    pub fn public_key(&self) -> &IssuerPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &IssuerSecretKey {
        &self.private
    }

    /// Returns the couple `(isk, ipk)`.
    pub fn into_parts(self) -> (IssuerSecretKey, IssuerPublicKey) {
        (self.private, self.public)
    }
}
