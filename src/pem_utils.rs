//! PEM labels and conversion helpers.

use pem::Pem;

use crate::error::{KmsSignError, Result};

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";

/// Wraps DER bytes in a PEM block with the given label.
pub fn der_to_pem(der_bytes: &[u8], label: &str) -> String {
    pem::encode(&Pem::new(label, der_bytes.to_vec()))
}

/// Extracts DER bytes from a PEM block, checking the label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>> {
    let block = pem::parse(pem_str)
        .map_err(|e| KmsSignError::InvalidInput(format!("invalid PEM data: {e}")))?;

    if block.tag() != expected_label {
        return Err(KmsSignError::InvalidInput(format!(
            "expected a {expected_label} block, found {}",
            block.tag()
        )));
    }

    Ok(block.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_der_bytes() {
        let der = vec![0x30, 0x03, 0x02, 0x01, 0x01];
        let pem_str = der_to_pem(&der, CERTIFICATE_REQUEST_LABEL);
        assert!(pem_str.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));

        let back = pem_to_der(&pem_str, CERTIFICATE_REQUEST_LABEL).unwrap();
        assert_eq!(back, der);
    }

    #[test]
    fn rejects_mismatched_labels() {
        let pem_str = der_to_pem(&[0x30, 0x00], CERTIFICATE_LABEL);
        let err = pem_to_der(&pem_str, CERTIFICATE_REQUEST_LABEL).unwrap_err();
        assert!(matches!(err, KmsSignError::InvalidInput(_)));
    }
}
