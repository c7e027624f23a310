pub mod extensions;
pub mod params;
pub mod template;

use der::{Decode, Encode, EncodePem};
use extensions::{BasicConstraints, SubjectKeyIdentifier, ToAndFromX509Extension};
use x509_cert::certificate::CertificateInner;

use crate::error::{KmsSignError, Result};
use crate::key::PublicKey;

/// Represents the supported signature algorithms for certificates.
///
/// Each variant corresponds to one entry of the remote key algorithm table;
/// the pairing with a hash function lives in [`crate::scheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA PKCS#1 v1.5.
    Sha256WithRsa,
    /// SHA-512 with RSA PKCS#1 v1.5.
    Sha512WithRsa,
    /// ECDSA with SHA-256.
    EcdsaWithSha256,
    /// ECDSA with SHA-384.
    EcdsaWithSha384,
}

impl SignatureAlgorithm {
    /// Builds the AlgorithmIdentifier for this algorithm.
    ///
    /// RSA variants carry an explicit NULL parameter per RFC 4055; ECDSA
    /// variants omit parameters entirely.
    pub fn to_algorithm_identifier(self) -> x509_cert::spki::AlgorithmIdentifierOwned {
        match self {
            SignatureAlgorithm::Sha256WithRsa => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(der::Any::null()),
            },
            SignatureAlgorithm::Sha512WithRsa => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
                parameters: Some(der::Any::null()),
            },
            SignatureAlgorithm::EcdsaWithSha256 => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
            SignatureAlgorithm::EcdsaWithSha384 => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
                parameters: None,
            },
        }
    }
}

/// Represents an issued X.509 certificate.
///
/// This struct provides encoding into DER or PEM formats plus the handful
/// of accessors issuance needs when the certificate acts as a parent.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Decodes a certificate from DER bytes.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der_bytes)
            .map_err(|e| KmsSignError::InvalidInput(format!("could not parse certificate: {e}")))?;
        Ok(Self { inner })
    }

    /// Decodes a certificate from a PEM `CERTIFICATE` block.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let block = pem::parse(pem_str)
            .map_err(|e| KmsSignError::InvalidInput(format!("invalid PEM data: {e}")))?;

        if block.tag() != crate::pem_utils::CERTIFICATE_LABEL {
            return Err(KmsSignError::InvalidInput(format!(
                "expected a CERTIFICATE block, found {}",
                block.tag()
            )));
        }

        Self::from_der(block.contents())
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))
    }

    /// The subject name, as encoded in the certificate.
    pub fn subject(&self) -> &x509_cert::name::Name {
        &self.inner.tbs_certificate.subject
    }

    /// The subject's public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509_spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// Whether the basic constraints extension marks this certificate as a
    /// CA. Absent basic constraints means not a CA.
    pub fn is_ca(&self) -> bool {
        self.find_extension::<BasicConstraints>()
            .map(|bc| bc.is_ca)
            .unwrap_or(false)
    }

    /// The subject key identifier extension value, if present.
    pub fn subject_key_identifier(&self) -> Option<Vec<u8>> {
        self.find_extension::<SubjectKeyIdentifier>()
            .map(|ski| ski.key_identifier)
    }

    fn find_extension<E: ToAndFromX509Extension>(&self) -> Option<E> {
        self.inner
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == E::OID)
            .and_then(|ext| E::from_x509_extension_value(ext.extn_value.as_bytes()).ok())
    }
}
