//! Role-specific certificate templates.
//!
//! Each assembler is a pure transform from a validated option set into a
//! [`CertificateTemplate`]. Policy decisions (key usage bits, criticality,
//! which constraints a role may carry) live here and nowhere else; the
//! issuer consumes the template verbatim.

use std::net::IpAddr;

use bon::Builder;
use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsages;

use super::extensions::ExtendedKeyUsageOption;
use super::params::{DistinguishedName, Validity};

/// Options for generating a self-signed root CA certificate.
#[derive(Clone, Debug, Builder)]
pub struct RootCaOptions {
    pub subject: DistinguishedName,
    pub days: i64,
}

/// Options for signing an intermediate CA certificate.
#[derive(Clone, Debug, Builder)]
pub struct IntermediateCaOptions {
    pub subject: DistinguishedName,
    pub days: i64,
    /// Number of further intermediate CAs allowed below this one. Zero is
    /// encoded explicitly, forbidding any subordinate CA.
    pub path_len: u8,
    /// DNS domains this CA may issue for. Non-empty lists produce a
    /// critical name constraints extension.
    #[builder(default)]
    pub permitted_dns_domains: Vec<String>,
    #[builder(default)]
    pub crl_distribution_points: Vec<String>,
}

/// Options for signing an end-entity (leaf) certificate.
#[derive(Clone, Debug, Builder)]
pub struct LeafOptions {
    pub subject: DistinguishedName,
    pub days: i64,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub ip_addresses: Vec<IpAddr>,
    /// Request the serverAuth extended key usage.
    #[builder(default)]
    pub server_auth: bool,
    /// Request the clientAuth extended key usage.
    #[builder(default)]
    pub client_auth: bool,
    #[builder(default)]
    pub crl_distribution_points: Vec<String>,
}

/// Options for generating a certificate signing request.
#[derive(Clone, Debug, Builder)]
pub struct CsrOptions {
    pub subject: DistinguishedName,
}

/// A fully assembled certificate template, ready for the issuer.
///
/// Holds everything role policy decides; the issuer adds the identity
/// fields (serial number, subject key identifier) it owns.
#[derive(Clone, Debug)]
pub struct CertificateTemplate {
    pub subject: DistinguishedName,
    pub validity: Validity,
    pub is_ca: bool,
    pub path_len: Option<u8>,
    pub key_usage: FlagSet<KeyUsages>,
    pub permitted_dns_domains: Vec<String>,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub extended_key_usages: Vec<ExtendedKeyUsageOption>,
    pub crl_distribution_points: Vec<String>,
}

/// A certificate-request template. CSRs carry a subject and nothing else.
#[derive(Clone, Debug)]
pub struct RequestTemplate {
    pub subject: DistinguishedName,
}

impl CertificateTemplate {
    /// Template for a self-signed root CA.
    ///
    /// No path length constraint: a root does not restrict the depth of the
    /// hierarchy below it.
    pub fn root_ca(options: &RootCaOptions) -> Self {
        Self {
            subject: options.subject.clone(),
            validity: Validity::for_days(options.days),
            is_ca: true,
            path_len: None,
            key_usage: KeyUsages::DigitalSignature | KeyUsages::CRLSign | KeyUsages::KeyCertSign,
            permitted_dns_domains: Vec::new(),
            dns_names: Vec::new(),
            ip_addresses: Vec::new(),
            extended_key_usages: Vec::new(),
            crl_distribution_points: Vec::new(),
        }
    }

    /// Template for an intermediate CA.
    ///
    /// The path length is always encoded, including zero.
    pub fn intermediate_ca(options: &IntermediateCaOptions) -> Self {
        Self {
            subject: options.subject.clone(),
            validity: Validity::for_days(options.days),
            is_ca: true,
            path_len: Some(options.path_len),
            key_usage: KeyUsages::DigitalSignature | KeyUsages::CRLSign | KeyUsages::KeyCertSign,
            permitted_dns_domains: options.permitted_dns_domains.clone(),
            dns_names: Vec::new(),
            ip_addresses: Vec::new(),
            extended_key_usages: Vec::new(),
            crl_distribution_points: options.crl_distribution_points.clone(),
        }
    }

    /// Template for an end-entity certificate.
    ///
    /// Server and client auth are independent; either, both, or neither may
    /// be requested.
    pub fn leaf(options: &LeafOptions) -> Self {
        let mut extended_key_usages = Vec::new();

        if options.server_auth {
            extended_key_usages.push(ExtendedKeyUsageOption::ServerAuth);
        }

        if options.client_auth {
            extended_key_usages.push(ExtendedKeyUsageOption::ClientAuth);
        }

        Self {
            subject: options.subject.clone(),
            validity: Validity::for_days(options.days),
            is_ca: false,
            path_len: None,
            key_usage: KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment,
            permitted_dns_domains: Vec::new(),
            dns_names: options.dns_names.clone(),
            ip_addresses: options.ip_addresses.clone(),
            extended_key_usages,
            crl_distribution_points: options.crl_distribution_points.clone(),
        }
    }
}

impl RequestTemplate {
    pub fn new(options: &CsrOptions) -> Self {
        Self {
            subject: options.subject.clone(),
        }
    }
}
