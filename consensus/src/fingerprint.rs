//! Fingerprint validation (spec §4.H "Fingerprint validation").

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid fingerprint `{0}`: must be 40 uppercase hex characters")]
pub struct InvalidFingerprint(pub String);

pub fn validate_fingerprint(fingerprint: &str) -> Result<(), InvalidFingerprint> {
    let is_valid = fingerprint.len() == 40
        && fingerprint.chars().all(|c| c.is_ascii_hexdigit())
        && fingerprint.chars().all(|c| !c.is_ascii_lowercase());
    if is_valid {
        Ok(())
    } else {
        Err(InvalidFingerprint(fingerprint.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_fingerprint() {
        assert!(validate_fingerprint("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").is_ok());
    }

    #[test]
    fn rejects_lowercase() {
        assert!(validate_fingerprint("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(validate_fingerprint("ABC").is_err());
    }
}
