//! # KmsSign - X.509 Certificate Issuance over Remote Signing Keys
//!
//! KmsSign issues X.509 certificates and certificate requests using asymmetric
//! keys held in a remote key management service. The private key never leaves
//! the KMS: certificates are assembled locally with rustcrypto libraries, then
//! the to-be-signed structure is hashed and the digest is sent to the service
//! for signing.
//!
//! ## Supported Key Algorithms
//!
//! The KMS key version determines the signature scheme; no local choice is
//! made:
//! - **RSA PKCS#1 v1.5**: 2048, 3072, and 4096-bit keys with SHA-256, plus
//!   4096-bit keys with SHA-512
//! - **ECDSA**: P-256 with SHA-256 and P-384 with SHA-384
//!
//! Any other key algorithm is rejected up front when the signer is opened.
//!
//! ## Key Features
//!
//! - **Remote signing**: only digests cross the wire, never key material
//! - **Role-checked issuance**: a root issuer self-signs exactly once, then
//!   acts as a subordinate; a subordinate refuses to sign unless its parent
//!   certificate is a CA
//! - **Template-driven profiles**: root CA, intermediate CA, and leaf
//!   certificate templates with the appropriate constraint and usage
//!   extensions
//! - **Certificate requests**: PKCS#10 CSRs signed by the remote key
//! - **Key provenance**: issued certificates carry a comment naming the KMS
//!   key that signed them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kmssign::{
//!     cert::params::DistinguishedName,
//!     cert::template::{CertificateTemplate, RootCaOptions},
//!     issuer::KmsIssuer,
//!     kms::{Digest, KeyAlgorithm, KmsClient, KmsError},
//!     signer::RemoteSigner,
//! };
//!
//! // Any transport to a KMS works; implement the client trait for it.
//! struct MyKms;
//!
//! impl KmsClient for MyKms {
//!     fn resolve_algorithm(&self, key_name: &str) -> Result<KeyAlgorithm, KmsError> {
//!         todo!()
//!     }
//!     fn fetch_public_key(&self, key_name: &str) -> Result<String, KmsError> {
//!         todo!()
//!     }
//!     fn asymmetric_sign(&self, key_name: &str, digest: Digest) -> Result<Vec<u8>, KmsError> {
//!         todo!()
//!     }
//! }
//!
//! # fn main() -> Result<(), kmssign::error::KmsSignError> {
//! let signer = RemoteSigner::open(
//!     MyKms,
//!     "projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/1",
//! )?;
//!
//! let subject = DistinguishedName::builder()
//!     .common_name("Example Root CA".to_string())
//!     .organization("Example Corp".to_string())
//!     .country("US".to_string())
//!     .build();
//!
//! let template = CertificateTemplate::root_ca(&RootCaOptions::builder()
//!     .subject(subject)
//!     .days(3650)
//!     .build());
//!
//! let mut issuer = KmsIssuer::root(signer);
//! let der = issuer.issue_self_signed(&template)?;
//!
//! let pem = kmssign::pem_utils::der_to_pem(&der, kmssign::pem_utils::CERTIFICATE_LABEL);
//! println!("{pem}");
//! # Ok(())
//! # }
//! ```
//!
//! After the self-signed certificate is issued, the same issuer can sign
//! children: intermediate CA certificates for other KMS keys, or leaf
//! certificates for any public key.
//!
//! ## Module Organization
//!
//! - [`kms`]: the client trait a KMS transport implements
//! - [`scheme`]: key algorithm to signature scheme resolution
//! - [`signer`]: the remote signer bound to one key version
//! - [`issuer`]: role-checked certificate and CSR issuance
//! - [`cert`]: certificate encoding, templates, and extensions
//! - [`key`]: public key import/export
//! - [`error`]: error types

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod kms;
pub mod pem_utils;
pub mod request;
pub mod scheme;
pub mod signer;
pub mod tbs_certificate;
