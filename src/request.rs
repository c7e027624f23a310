//! Assembly and signing of PKCS#10 certificate signing requests.
//!
//! A request carries the subject name and public key of the remote signing
//! key itself, self-signed to prove possession. No serial number, subject
//! key identifier, or provenance comment is attached; CSRs have none of
//! those fields.

use der::Encode;
use x509_cert::request::{CertReq, CertReqInfo, Version};

use crate::cert::template::RequestTemplate;
use crate::error::{KmsSignError, Result};
use crate::scheme::ResolvedScheme;
use crate::signer::CertificateSigner;

/// Builds and signs a certificate request for the signer's own key.
pub fn build_and_sign_request(
    template: &RequestTemplate,
    scheme: &ResolvedScheme,
    signer: &dyn CertificateSigner,
) -> Result<CertReq> {
    let info = CertReqInfo {
        version: Version::V1,
        subject: template.subject.to_x509_name()?,
        public_key: signer.public_key().to_spki()?,
        attributes: Default::default(),
    };

    let info_der = info
        .to_der()
        .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?;

    let digest = scheme.hash.digest(&info_der);
    let signature = signer.sign_digest(&digest, scheme.hash)?;

    Ok(CertReq {
        info,
        algorithm: scheme.signature.to_algorithm_identifier(),
        signature: der::asn1::BitString::from_bytes(&signature)
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?,
    })
}
