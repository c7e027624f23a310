//! Public key material for certificate subjects and remote signing keys.
//!
//! Private keys never appear in this crate; the remote service holds them.
//! What circulates locally is the decoded public half, either fetched from
//! the service or lifted out of a certificate request supplied by a caller.

use p256::ecdsa::VerifyingKey as P256VerifyingKey;
use p384::ecdsa::VerifyingKey as P384VerifyingKey;
use rsa::RsaPublicKey;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{KmsSignError, Result};

/// Supported public key types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
}

impl PublicKey {
    /// Decodes a PEM-encoded SubjectPublicKeyInfo block.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let block = pem::parse(pem_str)
            .map_err(|e| KmsSignError::InvalidInput(format!("invalid PEM data: {e}")))?;
        Self::from_spki_der(block.contents())
    }

    /// Decodes a DER-encoded SubjectPublicKeyInfo structure.
    pub fn from_spki_der(der_bytes: &[u8]) -> Result<Self> {
        use der::Decode;
        let spki = SubjectPublicKeyInfoOwned::from_der(der_bytes)
            .map_err(|e| KmsSignError::InvalidInput(format!("could not parse public key: {e}")))?;
        Self::from_x509_spki(&spki)
    }

    /// Converts a parsed SPKI structure into a typed public key.
    pub fn from_x509_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key_bits = spki.subject_public_key.raw_bytes();

        match spki.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                use rsa::pkcs1::DecodeRsaPublicKey;
                let public = RsaPublicKey::from_pkcs1_der(key_bits).map_err(|e| {
                    KmsSignError::InvalidInput(format!("could not parse RSA public key: {e}"))
                })?;
                Ok(PublicKey::Rsa(public))
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .ok_or_else(|| {
                        KmsSignError::InvalidInput("EC public key without curve parameters".into())
                    })?
                    .decode_as::<der::oid::ObjectIdentifier>()
                    .map_err(|e| {
                        KmsSignError::InvalidInput(format!("invalid EC curve parameters: {e}"))
                    })?;

                match curve {
                    const_oid::db::rfc5912::SECP_256_R_1 => {
                        let key = P256VerifyingKey::from_sec1_bytes(key_bits).map_err(|e| {
                            KmsSignError::InvalidInput(format!("invalid P-256 point: {e}"))
                        })?;
                        Ok(PublicKey::EcdsaP256(key))
                    }
                    const_oid::db::rfc5912::SECP_384_R_1 => {
                        let key = P384VerifyingKey::from_sec1_bytes(key_bits).map_err(|e| {
                            KmsSignError::InvalidInput(format!("invalid P-384 point: {e}"))
                        })?;
                        Ok(PublicKey::EcdsaP384(key))
                    }
                    other => Err(KmsSignError::InvalidInput(format!(
                        "unsupported EC curve: {other}"
                    ))),
                }
            }
            other => Err(KmsSignError::InvalidInput(format!(
                "unsupported public key algorithm: {other}"
            ))),
        }
    }

    /// Encodes this key as a SubjectPublicKeyInfo structure.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone()),
            PublicKey::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
            PublicKey::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
        };

        spki.map_err(|e| KmsSignError::EncodingFailed(e.to_string()))
    }

    /// The raw bit-string payload of this key's SPKI encoding.
    ///
    /// For EC keys this is the SEC1 point; for RSA keys the PKCS#1
    /// RSAPublicKey structure. Subject key identifiers hash exactly these
    /// bytes.
    pub fn spki_key_bits(&self) -> Result<Vec<u8>> {
        Ok(self.to_spki()?.subject_public_key.raw_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkcs8::EncodePublicKey;

    #[test]
    fn p256_key_round_trips_through_pem() {
        let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let verifying_key = *signing_key.verifying_key();

        let pem = verifying_key
            .to_public_key_pem(pkcs8::LineEnding::LF)
            .unwrap();
        let decoded = PublicKey::from_pem(&pem).unwrap();

        assert_eq!(decoded, PublicKey::EcdsaP256(verifying_key));
    }

    #[test]
    fn spki_key_bits_is_the_sec1_point() {
        let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let verifying_key = *signing_key.verifying_key();

        let bits = PublicKey::EcdsaP256(verifying_key).spki_key_bits().unwrap();
        let point = verifying_key.to_encoded_point(false);

        assert_eq!(bits, point.as_bytes());
    }

    #[test]
    fn garbage_pem_is_rejected() {
        let err = PublicKey::from_pem("not pem at all").unwrap_err();
        assert!(matches!(err, KmsSignError::InvalidInput(_)));
    }
}
