use chrono::{DateTime, Utc};

/// Account credential - the only persistent entity.
///
/// Deliberately not `Serialize`: the hash must never reach a response body.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Case-sensitive account identifier (the email), unique across accounts.
    pub identifier: String,
    /// PHC-formatted password hash.
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Create a new credential stamped with the current time.
    pub fn new(identifier: String, secret_hash: String) -> Self {
        Self {
            identifier,
            secret_hash,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &mask_identifier(&self.identifier))
            .field("secret_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Mask an identifier for logging so account emails do not land in logs.
///
/// `alice@example.com` becomes `a***@example.com`.
pub fn mask_identifier(identifier: &str) -> String {
    match identifier.find('@') {
        Some(at_pos) => {
            let (local, domain) = identifier.split_at(at_pos);
            match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***{domain}"),
                _ => format!("***{domain}"),
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_identifier() {
        assert_eq!(mask_identifier("alice@example.com"), "a***@example.com");
        assert_eq!(mask_identifier("a@x.com"), "***@x.com");
        assert_eq!(mask_identifier("no-at-sign"), "***");
    }

    #[test]
    fn test_debug_redacts_hash() {
        let credential = Credential::new("bob@example.com".into(), "$argon2id$secret".into());
        let rendered = format!("{credential:?}");

        assert!(!rendered.contains("argon2id"));
        assert!(!rendered.contains("bob@"));
        assert!(rendered.contains("<redacted>"));
    }
}
