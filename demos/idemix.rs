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

mod idemix_example {
    use idemix::{
        errors::Error,
        idemix::{
            cred_request::{BlindFactor, CredentialRequest},
            credential::IssuedCredential,
            keys::UserSecretKey,
            pseudonym::{NymSignature, Pseudonym},
            signature::Signature,
        },
        keys::{key::PublicKey, pair::IssuerKeyPair},
        schemes::algorithms::Scheme,
        utils::{message::Attribute, random::random_scalar},
    };

    pub(crate) fn idemix_main<S: Scheme>() -> Result<(), Error> {
        const ATTRIBUTE_NAMES: [&str; 4] = ["age", "country", "role", "organization"];
        log::info!("Attribute names: {:?}", ATTRIBUTE_NAMES);

        let mut rng = rand::thread_rng();

        log::info!("Issuer Keypair Generation");
        let issuer_keypair = IssuerKeyPair::generate::<S::Ciphersuite, _>(&ATTRIBUTE_NAMES, &mut rng)?;
        let ipk = issuer_keypair.public_key();
        log::info!("IPK: {}", ipk.encode()?);

        log::info!("User checks the issuer public key...");
        if !ipk.check::<S::Ciphersuite>() {
            return Err(Error::KeyGenError("issuer public key is not well formed".to_owned()));
        }

        log::info!("User generates the secret key");
        let sk = UserSecretKey::random(&mut rng);

        log::info!("Issuer sends a fresh nonce");
        let issuer_nonce = random_scalar(&mut rng);

        log::info!("User computes the credential request...");
        let cred_s1 = BlindFactor::random(&mut rng);
        let request = CredentialRequest::create::<S::Ciphersuite, _>(&sk, &cred_s1, &issuer_nonce, ipk, &mut rng)?;
        log::info!("Credential request: {}", hex::encode(request.to_bytes()));

        let attributes = vec![
            Attribute::from_u64(25),
            Attribute::from_bytes_as_hash::<S::Ciphersuite>(b"US")?,
            Attribute::from_bytes_as_hash::<S::Ciphersuite>(b"member")?,
            Attribute::from_bytes_as_hash::<S::Ciphersuite>(b"Org1MSP")?,
        ];

        log::info!("Issuer checks the request and signs the attributes...");
        let issued = IssuedCredential::issue::<S::Ciphersuite, _>(&issuer_keypair, &request, &attributes, &mut rng)?;

        log::info!("User completes the credential");
        let credential = issued.complete(&cred_s1);
        if !credential.ver(&sk, ipk) {
            return Err(Error::SignatureGenerationError("issued credential does not verify".to_owned()));
        }
        log::info!("Credential is VALID!");

        let msg = b"transaction proposal";
        let disclosure = [1u8, 0, 1, 0];
        log::info!("Disclosure: {:?}", disclosure);

        log::info!("User derives a fresh pseudonym and presents the credential...");
        let nym = Pseudonym::new(&sk, ipk, &mut rng);
        log::info!("Nym: {}", nym);
        let signature =
            Signature::present::<S::Ciphersuite, _>(&credential, &sk, &nym, ipk, &disclosure, msg, &mut rng)?;

        log::info!("Verifier checks the presentation...");
        let disclosed: Vec<Option<Attribute>> = disclosure
            .iter()
            .zip(attributes.iter())
            .map(|(&d, a)| if d == 1 { Some(*a) } else { None })
            .collect();
        let result = signature.verify::<S::Ciphersuite>(&disclosure, ipk, msg, &disclosed);
        assert!(result, "Presentation Verification Failed!");
        log::info!("Presentation is VALID!");

        log::info!("User signs a message under the same pseudonym...");
        let nym_signature = NymSignature::sign::<S::Ciphersuite, _>(&sk, &nym, ipk, msg, &mut rng)?;
        let result = nym_signature.verify::<S::Ciphersuite>(&nym.nym, ipk, msg);
        assert!(result, "Nym Signature Verification Failed!");
        log::info!("Nym Signature is VALID!");

        Ok(())
    }
}

fn main() {
    use crate::idemix_example::idemix_main;
    use idemix::schemes::algorithms::{IdemixBls12381Sha256, IdemixBls12381Shake256};
    use std::env;

    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        println!(
            "Usage: {} <cipher_suite>
                Ciphersuites:
                    - BLS12-381-SHA-256
                    - BLS12-381-SHAKE-256",
            args[0]
        );
        return;
    }

    let cipher_suite = &args[1];

    let result = match cipher_suite.as_str() {
        "BLS12-381-SHA-256" => {
            log::info!("Ciphersuite: BLS12-381-SHA-256");
            idemix_main::<IdemixBls12381Sha256>()
        }
        "BLS12-381-SHAKE-256" => {
            log::info!("Ciphersuite: BLS12-381-SHAKE-256");
            idemix_main::<IdemixBls12381Shake256>()
        }
        _ => {
            println!("Unknown cipher suite: {}", cipher_suite);
            return;
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
    }
}
