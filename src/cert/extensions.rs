use std::net::IpAddr;

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::constraints::name::GeneralSubtree;
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};

use crate::error::{KmsSignError, Result};

/// Netscape comment extension, used to record which remote key produced a
/// signature. Informational only.
pub const NS_COMMENT_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.113730.1.13");

/// Trait for converting to and from X.509 extension values.
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed
///   below this one. `Some(0)` is meaningfully different from `None`: the
///   former forbids any subordinate CA, the latter leaves the depth
///   unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ku = X509KeyUsage(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku
            .0
            .iter()
            .map(|v| match *v {
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Ok(ExtendedKeyUsageOption::ServerAuth),
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Ok(ExtendedKeyUsageOption::ClientAuth),
                _ => Err(KmsSignError::InvalidInput(
                    "unsupported extended key usage option".to_string(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { usage })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
        }
    }
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// # Fields
/// * `dns_names` - DNS name entries.
/// * `ip_addresses` - IP address entries (v4 or v6).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl SubjectAltName {
    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty() && self.ip_addresses.is_empty()
    }
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let mut names = Vec::new();

        for name in &self.dns_names {
            let dns = Ia5String::try_from(name.clone())
                .map_err(|e| KmsSignError::InvalidInput(format!("invalid DNS name: {e}")))?;
            names.push(GeneralName::DnsName(dns));
        }

        for ip in &self.ip_addresses {
            let octets = match ip {
                IpAddr::V4(v4) => v4.octets().to_vec(),
                IpAddr::V6(v6) => v6.octets().to_vec(),
            };
            names.push(GeneralName::IpAddress(OctetString::new(octets)?));
        }

        let san = x509_cert::ext::pkix::SubjectAltName(names);
        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let mut out = SubjectAltName::default();

        for name in san.0.iter() {
            match name {
                GeneralName::DnsName(dns) => out.dns_names.push(dns.to_string()),
                GeneralName::IpAddress(octets) => {
                    let bytes = octets.as_bytes();
                    let ip = match bytes.len() {
                        4 => IpAddr::from(<[u8; 4]>::try_from(bytes).unwrap()),
                        16 => IpAddr::from(<[u8; 16]>::try_from(bytes).unwrap()),
                        n => {
                            return Err(KmsSignError::InvalidInput(format!(
                                "IP address entry of {n} bytes"
                            )));
                        }
                    };
                    out.ip_addresses.push(ip);
                }
                _ => {
                    return Err(KmsSignError::InvalidInput(
                        "unsupported general name type".to_string(),
                    ));
                }
            }
        }

        Ok(out)
    }
}

/// Represents the Name Constraints extension, restricted to permitted DNS
/// subtrees.
///
/// Marked critical on the wire when attached: clients that do not
/// understand it must reject the certificate rather than ignore the
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermittedDnsDomains {
    pub domains: Vec<String>,
}

impl ToAndFromX509Extension for PermittedDnsDomains {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::NameConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let subtrees = self
            .domains
            .iter()
            .map(|domain| {
                let dns = Ia5String::try_from(domain.clone())
                    .map_err(|e| KmsSignError::InvalidInput(format!("invalid DNS domain: {e}")))?;
                Ok(GeneralSubtree {
                    base: GeneralName::DnsName(dns),
                    minimum: 0,
                    maximum: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let nc = x509_cert::ext::pkix::NameConstraints {
            permitted_subtrees: Some(subtrees),
            excluded_subtrees: None,
        };

        Ok(nc.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let nc = x509_cert::ext::pkix::NameConstraints::from_der(extension)?;
        let domains = nc
            .permitted_subtrees
            .unwrap_or_default()
            .into_iter()
            .filter_map(|subtree| match subtree.base {
                GeneralName::DnsName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect();
        Ok(Self { domains })
    }
}

/// Represents the CRL Distribution Points extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrlDistributionPoints {
    pub uris: Vec<String>,
}

impl ToAndFromX509Extension for CrlDistributionPoints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::CrlDistributionPoints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let points = self
            .uris
            .iter()
            .map(|uri| {
                let uri = Ia5String::try_from(uri.clone())
                    .map_err(|e| KmsSignError::InvalidInput(format!("invalid CRL URI: {e}")))?;
                Ok(DistributionPoint {
                    distribution_point: Some(DistributionPointName::FullName(vec![
                        GeneralName::UniformResourceIdentifier(uri),
                    ])),
                    reasons: None,
                    crl_issuer: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let crl_dp = x509_cert::ext::pkix::CrlDistributionPoints(points);
        Ok(crl_dp.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let crl_dp = x509_cert::ext::pkix::CrlDistributionPoints::from_der(extension)?;
        let mut uris = Vec::new();

        for point in crl_dp.0 {
            if let Some(DistributionPointName::FullName(names)) = point.distribution_point {
                for name in names {
                    if let GeneralName::UniformResourceIdentifier(uri) = name {
                        uris.push(uri.to_string());
                    }
                }
            }
        }

        Ok(Self { uris })
    }
}

/// Represents the Subject Key Identifier (SKI) extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ski =
            x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.key_identifier.as_slice())?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: ski.0.as_bytes().to_vec(),
        })
    }
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// Only the key identifier field is carried; issuer and serial forms are
/// not emitted by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::AuthorityKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };

        Ok(aki.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: aki
                .key_identifier
                .map(|id| id.as_bytes().to_vec())
                .unwrap_or_default(),
        })
    }
}

/// Informational comment naming the remote key that produced a signature.
///
/// Consumers never validate this; it exists so a certificate can be traced
/// back to the key resource that signed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyProvenanceComment {
    pub comment: String,
}

impl ToAndFromX509Extension for KeyProvenanceComment {
    const OID: ObjectIdentifier = NS_COMMENT_OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let value = Ia5String::try_from(self.comment.clone())
            .map_err(|e| KmsSignError::InvalidInput(format!("invalid comment: {e}")))?;
        Ok(value.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let value = Ia5String::from_der(extension)?;
        Ok(Self {
            comment: value.to_string(),
        })
    }
}
