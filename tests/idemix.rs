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

#[cfg(test)]
mod idemix_tests {

    use idemix::{
        errors::Error,
        idemix::{
            cred_request::{BlindFactor, CredentialRequest},
            credential::{Credential, IssuedCredential},
            keys::{IssuerPublicKey, UserSecretKey},
            pseudonym::{NymSignature, Pseudonym},
            signature::Signature,
        },
        keys::{
            key::{PrivateKey, PublicKey},
            pair::IssuerKeyPair,
        },
        schemes::algorithms::{IdemixBls12381Sha256, IdemixBls12381Shake256, Scheme},
        utils::{message::Attribute, random::random_scalar},
    };
    use rand::{rngs::StdRng, SeedableRng};

    const NAMES: [&str; 3] = ["age", "country", "role"];
    const MSG: &[u8] = b"transaction proposal";
    const DISCLOSURE: [u8; 3] = [0, 1, 0];

    struct Flow {
        issuer: IssuerKeyPair,
        sk: UserSecretKey,
        request: CredentialRequest,
        issued: IssuedCredential,
        credential: Credential,
        nym: Pseudonym,
        signature: Signature,
        nym_signature: NymSignature,
        attrs: Vec<Attribute>,
    }

    fn run_flow<S: Scheme>(rng: &mut StdRng) -> Flow {
        let issuer = IssuerKeyPair::generate::<S::Ciphersuite, _>(&NAMES, rng).unwrap();
        let ipk = issuer.public_key().clone();

        let sk = UserSecretKey::random(rng);
        let cred_s1 = BlindFactor::random(rng);
        let nonce = random_scalar(rng);
        let request = CredentialRequest::create::<S::Ciphersuite, _>(&sk, &cred_s1, &nonce, &ipk, rng).unwrap();

        let attrs = vec![
            Attribute::from_u64(25),
            Attribute::from_bytes_as_hash::<S::Ciphersuite>(b"US").unwrap(),
            Attribute::random(rng),
        ];
        let issued = IssuedCredential::issue::<S::Ciphersuite, _>(&issuer, &request, &attrs, rng).unwrap();
        let credential = issued.clone().complete(&cred_s1);

        let nym = Pseudonym::new(&sk, &ipk, rng);
        let signature =
            Signature::present::<S::Ciphersuite, _>(&credential, &sk, &nym, &ipk, &DISCLOSURE, MSG, rng).unwrap();
        let nym_signature = NymSignature::sign::<S::Ciphersuite, _>(&sk, &nym, &ipk, MSG, rng).unwrap();

        Flow { issuer, sk, request, issued, credential, nym, signature, nym_signature, attrs }
    }

    fn disclosed(attrs: &[Attribute]) -> Vec<Option<Attribute>> {
        DISCLOSURE.iter().zip(attrs.iter()).map(|(&d, a)| if d == 1 { Some(*a) } else { None }).collect()
    }

    //FULL FLOW - SHA256

    #[test]
    fn full_flow_sha256() {
        full_flow::<IdemixBls12381Sha256>();
    }

    //FULL FLOW - SHAKE256

    #[test]
    fn full_flow_shake256() {
        full_flow::<IdemixBls12381Shake256>();
    }

    //BYTES - SHA256

    #[test]
    fn bytes_round_trip_sha256() {
        bytes_round_trip::<IdemixBls12381Sha256>();
    }

    //BYTES - SHAKE256

    #[test]
    fn bytes_round_trip_shake256() {
        bytes_round_trip::<IdemixBls12381Shake256>();
    }

    //TAMPERING - SHA256

    #[test]
    fn tampered_bytes_sha256() {
        tampered_bytes::<IdemixBls12381Sha256>();
    }

    //TAMPERING - SHAKE256

    #[test]
    fn tampered_bytes_shake256() {
        tampered_bytes::<IdemixBls12381Shake256>();
    }

    //JSON - SHA256

    #[test]
    fn json_round_trip_sha256() {
        json_round_trip::<IdemixBls12381Sha256>();
    }

    //JSON - SHAKE256

    #[test]
    fn json_round_trip_shake256() {
        json_round_trip::<IdemixBls12381Shake256>();
    }

    //CONCURRENT VERIFICATION

    #[test]
    fn concurrent_verification_sha256() {
        concurrent_verification::<IdemixBls12381Sha256>();
    }

    #[test]
    fn concurrent_verification_shake256() {
        concurrent_verification::<IdemixBls12381Shake256>();
    }

    //CROSS CIPHERSUITE

    #[test]
    fn cross_ciphersuite() {
        type Sha = <IdemixBls12381Sha256 as Scheme>::Ciphersuite;
        type Shake = <IdemixBls12381Shake256 as Scheme>::Ciphersuite;

        let flow = run_flow::<IdemixBls12381Sha256>(&mut StdRng::seed_from_u64(11));
        let ipk = flow.issuer.public_key();
        let values = disclosed(&flow.attrs);

        assert!(!ipk.check::<Shake>());
        assert!(!flow.request.check::<Shake>(ipk));
        assert!(!flow.signature.verify::<Shake>(&DISCLOSURE, ipk, MSG, &values));
        assert!(!flow.nym_signature.verify::<Shake>(&flow.nym.nym, ipk, MSG));
        assert!(flow.signature.verify::<Sha>(&DISCLOSURE, ipk, MSG, &values));
    }

    //DETERMINISM

    #[test]
    fn seeded_flow_is_reproducible() {
        let first = run_flow::<IdemixBls12381Sha256>(&mut StdRng::seed_from_u64(42));
        let second = run_flow::<IdemixBls12381Sha256>(&mut StdRng::seed_from_u64(42));
        assert_eq!(first.issuer, second.issuer);
        assert_eq!(first.credential, second.credential);
        assert_eq!(first.signature.to_bytes().unwrap(), second.signature.to_bytes().unwrap());

        let other = run_flow::<IdemixBls12381Sha256>(&mut StdRng::seed_from_u64(43));
        assert_ne!(first.issuer.public_key(), other.issuer.public_key());
    }

    fn full_flow<S: Scheme>() {
        let flow = run_flow::<S>(&mut StdRng::from_entropy());
        let ipk = flow.issuer.public_key();

        assert!(ipk.check::<S::Ciphersuite>());
        assert!(flow.request.check::<S::Ciphersuite>(ipk));
        assert!(flow.credential.ver(&flow.sk, ipk));
        assert!(flow.signature.verify::<S::Ciphersuite>(&DISCLOSURE, ipk, MSG, &disclosed(&flow.attrs)));
        assert!(flow.nym_signature.verify::<S::Ciphersuite>(&flow.nym.nym, ipk, MSG));

        let index = ipk.attribute_index("country").unwrap();
        assert_eq!(DISCLOSURE[index], 1);
        assert_eq!(flow.credential.attributes()[index], flow.attrs[index]);
    }

    fn bytes_round_trip<S: Scheme>() {
        let flow = run_flow::<S>(&mut StdRng::from_entropy());
        let ipk = flow.issuer.public_key();

        let decoded_ipk = IssuerPublicKey::from_bytes(&ipk.to_bytes().unwrap()).unwrap();
        assert_eq!(&decoded_ipk, ipk);
        assert!(decoded_ipk.check::<S::Ciphersuite>());
        assert_eq!(PublicKey::encode(ipk).unwrap(), hex::encode(ipk.to_bytes().unwrap()));

        let request_bytes = flow.request.to_bytes();
        assert_eq!(request_bytes.len(), CredentialRequest::BYTES);
        assert_eq!(CredentialRequest::from_bytes(&request_bytes).unwrap(), flow.request);

        let issued = IssuedCredential::from_bytes(&flow.issued.to_bytes().unwrap()).unwrap();
        assert_eq!(issued, flow.issued);

        let credential = Credential::from_bytes(&flow.credential.to_bytes().unwrap()).unwrap();
        assert!(credential.ver(&flow.sk, ipk));

        let signature = Signature::from_bytes(&flow.signature.to_bytes().unwrap()).unwrap();
        assert!(signature.verify::<S::Ciphersuite>(&DISCLOSURE, ipk, MSG, &disclosed(&flow.attrs)));

        let nym = Pseudonym::from_bytes(&flow.nym.to_bytes()).unwrap();
        assert_eq!(nym, flow.nym);

        let nym_signature_bytes = flow.nym_signature.to_bytes();
        assert_eq!(nym_signature_bytes.len(), NymSignature::BYTES);
        let nym_signature = NymSignature::from_bytes(&nym_signature_bytes).unwrap();
        assert!(nym_signature.verify::<S::Ciphersuite>(&nym.nym, ipk, MSG));

        let sk = UserSecretKey::from_hex(&flow.sk.encode()).unwrap();
        assert_eq!(sk, flow.sk);
        assert!(credential.ver(&sk, ipk));
    }

    fn tampered_bytes<S: Scheme>() {
        let flow = run_flow::<S>(&mut StdRng::from_entropy());
        let ipk = flow.issuer.public_key();
        let values = disclosed(&flow.attrs);

        let bytes = ipk.to_bytes().unwrap();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            if let Ok(key) = IssuerPublicKey::from_bytes(&tampered) {
                assert!(!key.check::<S::Ciphersuite>(), "ipk byte {}", i);
            }
        }

        let bytes = flow.request.to_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            if let Ok(request) = CredentialRequest::from_bytes(&tampered) {
                assert!(!request.check::<S::Ciphersuite>(ipk), "request byte {}", i);
            }
        }

        let bytes = flow.credential.to_bytes().unwrap();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            if let Ok(credential) = Credential::from_bytes(&tampered) {
                assert!(!credential.ver(&flow.sk, ipk), "credential byte {}", i);
            }
        }

        let bytes = flow.signature.to_bytes().unwrap();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            if let Ok(signature) = Signature::from_bytes(&tampered) {
                assert!(!signature.verify::<S::Ciphersuite>(&DISCLOSURE, ipk, MSG, &values), "signature byte {}", i);
            }
        }

        assert!(matches!(Signature::from_bytes(&bytes[..bytes.len() - 1]), Err(Error::DeserializationError(_))));
        let mut extended = bytes.clone();
        extended.push(0);
        assert!(matches!(Signature::from_bytes(&extended), Err(Error::DeserializationError(_))));
    }

    fn json_round_trip<S: Scheme>() {
        let flow = run_flow::<S>(&mut StdRng::from_entropy());
        let ipk = flow.issuer.public_key();

        let json = serde_json::to_string(ipk).unwrap();
        let decoded_ipk: IssuerPublicKey = serde_json::from_str(&json).unwrap();
        assert!(decoded_ipk.check::<S::Ciphersuite>());

        let json = serde_json::to_string(&flow.signature).unwrap();
        let signature: Signature = serde_json::from_str(&json).unwrap();
        assert!(signature.verify::<S::Ciphersuite>(&DISCLOSURE, &decoded_ipk, MSG, &disclosed(&flow.attrs)));

        let json = serde_json::to_string(&flow.credential).unwrap();
        let credential: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(credential, flow.credential);
    }

    fn concurrent_verification<S: Scheme>() {
        let flow = run_flow::<S>(&mut StdRng::from_entropy());
        let ipk = flow.issuer.public_key();
        let values = disclosed(&flow.attrs);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| flow.signature.verify::<S::Ciphersuite>(&DISCLOSURE, ipk, MSG, &values)))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });
    }
}
