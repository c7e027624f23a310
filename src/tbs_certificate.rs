//! Assembly and signing of the "To Be Signed" portion of a certificate.
//!
//! The issuer hands a fully populated [`TbsCertificate`] plus a signing
//! capability to [`build_and_sign_certificate`]; everything ASN.1 lives
//! here. The signature is produced over a locally computed digest of the
//! TBS encoding, never over the raw bytes, because the remote service only
//! accepts digests.

use der::Encode;
use der::asn1::OctetString;
use x509_cert::Version;
use x509_cert::certificate::{CertificateInner, TbsCertificateInner};
use x509_cert::serial_number::SerialNumber;

use crate::cert::Certificate;
use crate::cert::params::{ExtensionParam, Validity};
use crate::error::{KmsSignError, Result};
use crate::key::PublicKey;
use crate::scheme::ResolvedScheme;
use crate::signer::CertificateSigner;

/// Represents the TBS portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - Unique identifier, minimal positive INTEGER bytes.
/// * `scheme` - Signature scheme and hash fixed by the signing key.
/// * `issuer` - Issuer name, taken verbatim from the parent certificate
///   (or from the subject for self-signed certificates).
/// * `validity` - The certificate validity window.
/// * `subject` - Subject distinguished name.
/// * `subject_public_key` - The subject's public key.
/// * `extensions` - Assembled extensions, in issuance order.
pub struct TbsCertificate {
    pub serial_number: Vec<u8>,
    pub scheme: ResolvedScheme,
    pub issuer: x509_cert::name::Name,
    pub validity: Validity,
    pub subject: x509_cert::name::Name,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts into the `x509-cert` representation for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let algorithm_id = self.scheme.signature.to_algorithm_identifier();

        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<der::Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm_id,
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}

/// Builds, signs, and assembles a complete certificate.
///
/// The inner and outer signature algorithm identifiers both come from the
/// TBS scheme, so they cannot disagree.
pub fn build_and_sign_certificate(
    tbs: &TbsCertificate,
    signer: &dyn CertificateSigner,
) -> Result<Certificate> {
    let tbs_inner = tbs.to_tbs_certificate_inner()?;
    let tbs_der = tbs_inner
        .to_der()
        .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?;

    let digest = tbs.scheme.hash.digest(&tbs_der);
    let signature = signer.sign_digest(&digest, tbs.scheme.hash)?;

    let inner = CertificateInner {
        tbs_certificate: tbs_inner,
        signature_algorithm: tbs.scheme.signature.to_algorithm_identifier(),
        signature: der::asn1::BitString::from_bytes(&signature)
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?,
    };

    Ok(Certificate { inner })
}

/// UTCTime until 2049, GeneralizedTime from 2050 on, per RFC 5280.
fn to_x509_time(t: time::OffsetDateTime) -> Result<x509_cert::time::Time> {
    let system_time: std::time::SystemTime = t.into();

    if t.year() < 2050 {
        let utc = der::asn1::UtcTime::from_system_time(system_time)
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?;
        Ok(x509_cert::time::Time::UtcTime(utc))
    } else {
        let date_time = der::DateTime::from_system_time(system_time)
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?;
        Ok(x509_cert::time::Time::GeneralTime(
            der::asn1::GeneralizedTime::from_date_time(date_time),
        ))
    }
}
