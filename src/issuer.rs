//! Certificate issuance over a remote signing key.
//!
//! [`KmsIssuer`] owns the issuance role (root or subordinate), computes the
//! identity fields every certificate needs (serial number, subject key
//! identifier), assembles the role-specific extension set from a template,
//! and delegates encoding and signing to [`crate::tbs_certificate`] and
//! [`crate::request`].

use log::info;
use sha1::{Digest as _, Sha1};

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, CrlDistributionPoints, ExtendedKeyUsage,
    KeyProvenanceComment, KeyUsage, PermittedDnsDomains, SubjectAltName, SubjectKeyIdentifier,
};
use crate::cert::params::ExtensionParam;
use crate::cert::template::{CertificateTemplate, RequestTemplate};
use crate::error::{KmsSignError, Result, RoleViolation};
use crate::key::PublicKey;
use crate::kms::KmsClient;
use crate::request::build_and_sign_request;
use crate::signer::{CertificateSigner, RemoteSigner};
use crate::tbs_certificate::{TbsCertificate, build_and_sign_certificate};

/// The issuance role an issuer is constructed with.
///
/// A `Root` issuer may produce exactly one self-signed certificate; doing
/// so transitions it to `Subordinate` holding that certificate as its own
/// issuer reference. A `Subordinate` issuer signs children on behalf of
/// its bound certificate, which must be a CA.
#[derive(Debug, Clone)]
pub enum IssuerRole {
    Root,
    Subordinate(Certificate),
}

/// Computes a subject key identifier per RFC 3280 §4.2.1.2, method 1:
/// the SHA-1 digest of the bit-string payload of the key's SPKI encoding.
pub fn subject_key_identifier(key: &PublicKey) -> Result<Vec<u8>> {
    let key_bits = key.spki_key_bits()?;
    Ok(Sha1::digest(&key_bits).to_vec())
}

/// Samples a serial number uniformly from [0, 2^64), encoded as a minimal
/// positive INTEGER.
pub fn generate_serial_number() -> Vec<u8> {
    encode_serial(rand::random::<u64>())
}

fn encode_serial(serial: u64) -> Vec<u8> {
    let bytes = serial.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let mut out = bytes[first..].to_vec();

    // DER INTEGER is signed; keep the value positive.
    if out[0] & 0x80 != 0 {
        out.insert(0, 0);
    }

    out
}

/// Issues certificates and requests signed by a remote key.
pub struct KmsIssuer<C: KmsClient> {
    signer: RemoteSigner<C>,
    role: IssuerRole,
    generate_comment: bool,
}

impl<C: KmsClient> KmsIssuer<C> {
    /// An issuer that will self-sign its first (and only) certificate.
    pub fn root(signer: RemoteSigner<C>) -> Self {
        Self {
            signer,
            role: IssuerRole::Root,
            generate_comment: true,
        }
    }

    /// An issuer bound to an existing parent certificate.
    ///
    /// The parent's CA flag is checked at signing time, not here, so that
    /// the violation is reported against the operation that needs it.
    pub fn subordinate(signer: RemoteSigner<C>, parent: Certificate) -> Self {
        Self {
            signer,
            role: IssuerRole::Subordinate(parent),
            generate_comment: true,
        }
    }

    /// Disables the informational provenance comment extension.
    pub fn without_comment(mut self) -> Self {
        self.generate_comment = false;
        self
    }

    /// The current role. After a successful self-signing this is
    /// `Subordinate` holding the issued certificate.
    pub fn role(&self) -> &IssuerRole {
        &self.role
    }

    /// Issues a self-signed certificate for the remote key itself.
    ///
    /// The remote key is both subject and issuer: the subject key
    /// identifier is computed over its own public key.
    pub fn issue_self_signed(&mut self, template: &CertificateTemplate) -> Result<Vec<u8>> {
        if !matches!(self.role, IssuerRole::Root) {
            return Err(KmsSignError::RoleViolation(RoleViolation::SelfSignRequiresRoot));
        }

        let subject_key = self.signer.public_key().clone();
        let ski = subject_key_identifier(&subject_key)?;
        let name = template.subject.to_x509_name()?;

        // Self-signed: the authority key identifier is its own SKI.
        let extensions = self.assemble_extensions(template, &ski, &ski)?;

        let tbs = TbsCertificate {
            serial_number: generate_serial_number(),
            scheme: self.signer.scheme().clone(),
            issuer: name.clone(),
            validity: template.validity.clone(),
            subject: name,
            subject_public_key: subject_key,
            extensions,
        };

        let certificate = build_and_sign_certificate(&tbs, &self.signer)?;
        let der = certificate.to_der()?;

        info!(
            "issued self-signed certificate for {} with {}",
            template.subject.common_name,
            self.signer.key_name()
        );

        self.role = IssuerRole::Subordinate(certificate);

        Ok(der)
    }

    /// Issues a certificate for `child_public_key`, signed by the bound
    /// parent.
    pub fn issue_child(
        &self,
        template: &CertificateTemplate,
        child_public_key: &PublicKey,
    ) -> Result<Vec<u8>> {
        let parent = match &self.role {
            IssuerRole::Root => {
                return Err(KmsSignError::RoleViolation(RoleViolation::NoParentBound));
            }
            IssuerRole::Subordinate(parent) => parent,
        };

        if !parent.is_ca() {
            return Err(KmsSignError::RoleViolation(RoleViolation::ParentNotCa));
        }

        let ski = subject_key_identifier(child_public_key)?;

        let authority_key_id = match parent.subject_key_identifier() {
            Some(id) => id,
            None => subject_key_identifier(&parent.public_key()?)?,
        };

        let extensions = self.assemble_extensions(template, &ski, &authority_key_id)?;

        let tbs = TbsCertificate {
            serial_number: generate_serial_number(),
            scheme: self.signer.scheme().clone(),
            issuer: parent.subject().clone(),
            validity: template.validity.clone(),
            subject: template.subject.to_x509_name()?,
            subject_public_key: child_public_key.clone(),
            extensions,
        };

        let certificate = build_and_sign_certificate(&tbs, &self.signer)?;

        info!(
            "issued certificate for {} with {}",
            template.subject.common_name,
            self.signer.key_name()
        );

        certificate.to_der()
    }

    /// Builds and signs a certificate request for the remote key.
    ///
    /// No role precondition: a request has no issuer.
    pub fn issue_csr(&self, template: &RequestTemplate) -> Result<Vec<u8>> {
        use der::Encode;

        let request = build_and_sign_request(template, self.signer.scheme(), &self.signer)?;

        request
            .to_der()
            .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))
    }

    /// Assembles the extension set for a certificate template.
    ///
    /// Optional extensions are omitted entirely when their source list is
    /// empty; an empty extension never appears on the wire.
    fn assemble_extensions(
        &self,
        template: &CertificateTemplate,
        subject_key_id: &[u8],
        authority_key_id: &[u8],
    ) -> Result<Vec<ExtensionParam>> {
        let basic_constraints = BasicConstraints {
            is_ca: template.is_ca,
            max_path_length: template.path_len,
        };

        let mut extensions = vec![
            ExtensionParam::from_extension(&basic_constraints, true)?,
            ExtensionParam::from_extension(&KeyUsage(template.key_usage), true)?,
            ExtensionParam::from_extension(
                &SubjectKeyIdentifier {
                    key_identifier: subject_key_id.to_vec(),
                },
                false,
            )?,
            ExtensionParam::from_extension(
                &AuthorityKeyIdentifier {
                    key_identifier: authority_key_id.to_vec(),
                },
                false,
            )?,
        ];

        if !template.permitted_dns_domains.is_empty() {
            let constraints = PermittedDnsDomains {
                domains: template.permitted_dns_domains.clone(),
            };
            extensions.push(ExtensionParam::from_extension(&constraints, true)?);
        }

        let san = SubjectAltName {
            dns_names: template.dns_names.clone(),
            ip_addresses: template.ip_addresses.clone(),
        };

        if !san.is_empty() {
            extensions.push(ExtensionParam::from_extension(&san, false)?);
        }

        if !template.extended_key_usages.is_empty() {
            let eku = ExtendedKeyUsage {
                usage: template.extended_key_usages.clone(),
            };
            extensions.push(ExtensionParam::from_extension(&eku, false)?);
        }

        if !template.crl_distribution_points.is_empty() {
            let crl_dp = CrlDistributionPoints {
                uris: template.crl_distribution_points.clone(),
            };
            extensions.push(ExtensionParam::from_extension(&crl_dp, false)?);
        }

        if self.generate_comment {
            let comment = KeyProvenanceComment {
                comment: format!("Signed with KMS key: {}", self.signer.key_name()),
            };
            extensions.push(ExtensionParam::from_extension(&comment, false)?);
        }

        Ok(extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn subject_key_identifier_is_deterministic_sha1_of_key_bits() {
        let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let key = PublicKey::EcdsaP256(*signing_key.verifying_key());

        let first = subject_key_identifier(&key).unwrap();
        let second = subject_key_identifier(&key).unwrap();

        assert_eq!(first.len(), 20);
        assert_eq!(first, second);

        let point = signing_key.verifying_key().to_encoded_point(false);
        let expected = Sha1::digest(point.as_bytes()).to_vec();
        assert_eq!(first, expected);
    }

    #[test]
    fn serial_numbers_are_unique_and_in_range() {
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let serial = generate_serial_number();
            // Minimal positive INTEGER of a u64: at most 8 value bytes plus
            // an optional sign byte.
            assert!(!serial.is_empty());
            assert!(serial.len() <= 9);
            if serial.len() == 9 {
                assert_eq!(serial[0], 0);
            }
            assert!(seen.insert(serial));
        }
    }

    #[test]
    fn serial_encoding_is_minimal_and_positive() {
        assert_eq!(encode_serial(0), vec![0]);
        assert_eq!(encode_serial(1), vec![1]);
        assert_eq!(encode_serial(0x80), vec![0, 0x80]);
        assert_eq!(encode_serial(0x1234), vec![0x12, 0x34]);
        assert_eq!(
            encode_serial(u64::MAX),
            vec![0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }
}
