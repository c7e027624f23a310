use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Ia5String, SetOfVec};
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{KmsSignError, Result};

/// PKCS#9 emailAddress attribute, carried as an extra RDN when supplied.
pub const EMAIL_ADDRESS_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// Distinguished name parameters for an X.509 subject.
///
/// # Fields
/// * `common_name` - The common name (CN); the only mandatory attribute.
/// * `country` - The country (C).
/// * `province` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
/// * `email_address` - Non-standard PKCS#9 email attribute (IA5String).
#[derive(Clone, Debug, Builder, Default)]
pub struct DistinguishedName {
    pub common_name: String,
    pub country: Option<String>,
    pub province: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
    pub email_address: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509 RDN sequence.
    ///
    /// Only attributes that are present are emitted. The email attribute
    /// cannot be expressed in RFC 4514 string form, so it is appended as a
    /// manually built RDN with an IA5String value.
    pub fn to_x509_name(&self) -> Result<x509_cert::name::Name> {
        use core::str::FromStr;

        let mut parts = vec![format!("CN={}", escape_rdn_value(&self.common_name))];

        if let Some(ou) = &self.organization_unit {
            parts.push(format!("OU={}", escape_rdn_value(ou)));
        }
        if let Some(o) = &self.organization {
            parts.push(format!("O={}", escape_rdn_value(o)));
        }
        if let Some(l) = &self.locality {
            parts.push(format!("L={}", escape_rdn_value(l)));
        }
        if let Some(st) = &self.province {
            parts.push(format!("ST={}", escape_rdn_value(st)));
        }
        if let Some(c) = &self.country {
            parts.push(format!("C={}", escape_rdn_value(c)));
        }

        let mut name = RdnSequence::from_str(&parts.join(","))
            .map_err(|e| KmsSignError::InvalidInput(format!("invalid subject name: {e}")))?;

        if let Some(email) = &self.email_address {
            let value = Ia5String::try_from(email.clone()).map_err(|e| {
                KmsSignError::InvalidInput(format!("invalid email address: {e}"))
            })?;
            let attribute = AttributeTypeAndValue {
                oid: EMAIL_ADDRESS_OID,
                value: der::Any::encode_from(&value)
                    .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?,
            };
            let set = SetOfVec::try_from(vec![attribute])
                .map_err(|e| KmsSignError::EncodingFailed(e.to_string()))?;
            name.0.push(RelativeDistinguishedName(set));
        }

        Ok(name)
    }
}

/// Escapes an attribute value for RFC 4514 string assembly.
///
/// Special characters are backslash-escaped anywhere they appear; a space
/// or `#` needs escaping only at the start of the value, and a space only
/// at the end (RFC 4514 §2.4).
fn escape_rdn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let char_count = value.chars().count();

    for (i, c) in value.chars().enumerate() {
        let needs_escape = matches!(c, '"' | '+' | ',' | ';' | '<' | '>' | '\\' | '=')
            || (i == 0 && matches!(c, ' ' | '#'))
            || (i == char_count - 1 && c == ' ');

        if needs_escape {
            out.push('\\');
        }
        out.push(c);
    }

    out
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// Zero or negative day counts are accepted; they produce an expired or
    /// inverted window and are a caller validation concern.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// Represents an X.509 extension ready for certificate assembly.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded extension value.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a typed extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes this parameter back into a typed extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Tagged;

    #[test]
    fn name_includes_only_present_attributes() {
        let dn = DistinguishedName::builder()
            .common_name("Test Root".to_string())
            .organization("Example Corp".to_string())
            .build();

        let name = dn.to_x509_name().unwrap();
        let rendered = name.to_string();

        assert!(rendered.contains("CN=Test Root"));
        assert!(rendered.contains("O=Example Corp"));
        assert!(!rendered.contains("OU="));
        assert!(!rendered.contains("C="));
    }

    #[test]
    fn email_address_becomes_an_extra_rdn() {
        let dn = DistinguishedName::builder()
            .common_name("Test Root".to_string())
            .email_address("ca@example.com".to_string())
            .build();

        let name = dn.to_x509_name().unwrap();
        let email_rdn = name
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .find(|attr| attr.oid == EMAIL_ADDRESS_OID)
            .expect("email RDN present");

        assert_eq!(email_rdn.value.tag(), der::Tag::Ia5String);
    }

    #[test]
    fn rdn_escaping_rules() {
        assert_eq!(escape_rdn_value("plain"), "plain");
        assert_eq!(escape_rdn_value("Example, Inc."), "Example\\, Inc.");
        assert_eq!(escape_rdn_value("a=b+c"), "a\\=b\\+c");
        assert_eq!(escape_rdn_value("semi;colon"), "semi\\;colon");
        assert_eq!(escape_rdn_value(" leading"), "\\ leading");
        assert_eq!(escape_rdn_value("#leading"), "\\#leading");
        assert_eq!(escape_rdn_value("trailing "), "trailing\\ ");
        assert_eq!(escape_rdn_value("mid space"), "mid space");
    }

    #[test]
    fn subject_values_with_special_characters_survive() {
        use core::str::FromStr;

        let dn = DistinguishedName::builder()
            .common_name("Example, Inc. Root".to_string())
            .organization("A + B Holdings".to_string())
            .build();

        let name = dn.to_x509_name().unwrap();
        assert_eq!(name.0.len(), 2);

        // Display re-escapes, so the string form must parse back to the
        // same sequence.
        let rendered = name.to_string();
        assert!(rendered.contains("Example\\, Inc. Root"));
        let reparsed = x509_cert::name::RdnSequence::from_str(&rendered).unwrap();
        assert_eq!(reparsed, name);
    }

    #[test]
    fn extension_param_decodes_back_to_its_typed_form() {
        use crate::cert::extensions::BasicConstraints;

        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(1),
        };
        let param = ExtensionParam::from_extension(&original, true).unwrap();

        assert_eq!(param.oid, BasicConstraints::OID);
        assert!(param.critical);

        let decoded: BasicConstraints = param.to_extension().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn validity_spans_the_requested_days() {
        let validity = Validity::for_days(365);
        assert_eq!(validity.not_after - validity.not_before, Duration::days(365));
    }
}
