use der::oid::ObjectIdentifier;
use kmssign::kms::{Digest, KeyAlgorithm, KmsClient, KmsError};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use pkcs8::EncodePublicKey;
use rsa::Pkcs1v15Sign;
use sha2::Sha256;
use x509_cert::certificate::CertificateInner;

pub const KEY_NAME: &str =
    "projects/test/locations/global/keyRings/ring/cryptoKeys/key/cryptoKeyVersions/1";

pub enum StubKey {
    P256(p256::ecdsa::SigningKey),
    Rsa(rsa::RsaPrivateKey),
}

/// An in-process stand-in for the remote service, holding a real signing
/// key so issued certificates can be verified.
pub struct StubKms {
    algorithm: KeyAlgorithm,
    key: StubKey,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl StubKms {
    pub fn ec_p256() -> Self {
        init_logging();
        Self {
            algorithm: KeyAlgorithm::EcSignP256Sha256,
            key: StubKey::P256(p256::ecdsa::SigningKey::random(&mut rand_core::OsRng)),
        }
    }

    pub fn rsa_2048() -> Self {
        init_logging();
        let key = rsa::RsaPrivateKey::new(&mut rand_core::OsRng, 2048).unwrap();
        Self {
            algorithm: KeyAlgorithm::RsaSignPkcs1_2048Sha256,
            key: StubKey::Rsa(key),
        }
    }

    pub fn p256_verifying_key(&self) -> p256::ecdsa::VerifyingKey {
        match &self.key {
            StubKey::P256(signing_key) => *signing_key.verifying_key(),
            StubKey::Rsa(_) => panic!("not a P-256 key"),
        }
    }

    pub fn rsa_public_key(&self) -> rsa::RsaPublicKey {
        match &self.key {
            StubKey::Rsa(private_key) => private_key.to_public_key(),
            StubKey::P256(_) => panic!("not an RSA key"),
        }
    }
}

impl KmsClient for StubKms {
    fn resolve_algorithm(&self, _key_name: &str) -> Result<KeyAlgorithm, KmsError> {
        Ok(self.algorithm.clone())
    }

    fn fetch_public_key(&self, _key_name: &str) -> Result<String, KmsError> {
        let pem = match &self.key {
            StubKey::P256(signing_key) => signing_key
                .verifying_key()
                .to_public_key_pem(pkcs8::LineEnding::LF),
            StubKey::Rsa(private_key) => private_key
                .to_public_key()
                .to_public_key_pem(pkcs8::LineEnding::LF),
        };
        pem.map_err(|e| KmsError::new(e.to_string()))
    }

    fn asymmetric_sign(&self, _key_name: &str, digest: Digest) -> Result<Vec<u8>, KmsError> {
        match &self.key {
            StubKey::P256(signing_key) => {
                let signature: p256::ecdsa::Signature = signing_key
                    .sign_prehash(digest.as_bytes())
                    .map_err(|e| KmsError::new(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            StubKey::Rsa(private_key) => private_key
                .sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes())
                .map_err(|e| KmsError::new(e.to_string())),
        }
    }
}

/// Looks up an extension by OID, returning its criticality and raw value.
pub fn find_extension(
    cert: &CertificateInner,
    oid: ObjectIdentifier,
) -> Option<(bool, Vec<u8>)> {
    cert.tbs_certificate
        .extensions
        .as_ref()?
        .iter()
        .find(|ext| ext.extn_id == oid)
        .map(|ext| (ext.critical, ext.extn_value.as_bytes().to_vec()))
}
