//! Customer model — §3 Customer
//!
//! Name and email are PII and stored encrypted; the repository layer maps
//! raw columns into [`shared::pii::EncryptedField`] by hand since that type
//! has no `sqlx::Type` impl (decryption requires the master key, which the
//! repository does not hold).

use chrono::{DateTime, Utc};
use shared::pii::EncryptedField;

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i64,
    pub display_name: EncryptedField,
    pub email: EncryptedField,
    pub phone: Option<EncryptedField>,
    pub physical_description: Option<String>,
    pub avatar_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// True iff this customer's stored email is the synthetic anonymous
    /// sentinel rather than a real contact address — the caller must still
    /// decrypt to check, since only the plaintext carries the pattern.
    pub fn is_anonymous(&self, key: &shared::pii::PiiKey) -> bool {
        self.email
            .decrypt(key)
            .map(|e| shared::pii::is_synthetic_anon_email(&e))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::pii::PiiKey;

    fn customer(key: &PiiKey, email: &str) -> Customer {
        Customer {
            id: 1,
            display_name: EncryptedField::encrypt(key, "Jane Doe"),
            email: EncryptedField::encrypt(key, email),
            phone: None,
            physical_description: None,
            avatar_ref: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn synthetic_anon_email_is_anonymous() {
        let key = PiiKey::generate();
        let c = customer(&key, &shared::pii::synthetic_anon_email());
        assert!(c.is_anonymous(&key));
    }

    #[test]
    fn real_email_is_not_anonymous() {
        let key = PiiKey::generate();
        let c = customer(&key, "jane@example.com");
        assert!(!c.is_anonymous(&key));
    }

    #[test]
    fn undecryptable_field_is_not_anonymous() {
        let key = PiiKey::generate();
        let other = PiiKey::generate();
        let c = customer(&key, "jane@example.com");
        assert!(!c.is_anonymous(&other));
    }
}
