//! Employee model — §3 Employee

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pii::EncryptedField;
use shared::scope::Scope;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Waiter,
    Chef,
    Cashier,
    Admin,
}

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: i64,
    pub display_name: EncryptedField,
    pub email: EncryptedField,
    pub credential_hash: String,
    pub primary_role: Role,
    pub additional_roles: Vec<Role>,
    pub is_active: bool,
    pub allowed_scopes: Vec<Scope>,
    pub signed_in_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub preferences: HashMap<String, serde_json::Value>,
}

impl Employee {
    /// `is_signed_in(window)` — true iff signed in and active within `window`.
    pub fn is_signed_in(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        match (self.signed_in_at, self.last_activity_at) {
            (Some(_), Some(last)) => now - last <= window,
            _ => false,
        }
    }

    /// Whether new orders accepted by this waiter auto-assign the table,
    /// defaulted from `ASSIGNMENT_AUTO_ON_ACCEPT_DEFAULT` at employee creation.
    pub fn auto_assign_on_accept(&self) -> bool {
        self.preferences
            .get("auto_assign_table_on_order_accept")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.allowed_scopes.contains(&scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::pii::EncryptedField;

    fn employee(preferences: HashMap<String, serde_json::Value>) -> Employee {
        Employee {
            id: 1,
            display_name: EncryptedField::from_parts(String::new(), String::new()),
            email: EncryptedField::from_parts(String::new(), String::new()),
            credential_hash: "hash".into(),
            primary_role: Role::Waiter,
            additional_roles: vec![],
            is_active: true,
            allowed_scopes: vec![Scope::Waiter],
            signed_in_at: None,
            last_activity_at: None,
            preferences,
        }
    }

    #[test]
    fn auto_assign_defaults_to_true_when_unset() {
        assert!(employee(HashMap::new()).auto_assign_on_accept());
    }

    #[test]
    fn auto_assign_respects_explicit_false() {
        let mut prefs = HashMap::new();
        prefs.insert("auto_assign_table_on_order_accept".into(), serde_json::json!(false));
        assert!(!employee(prefs).auto_assign_on_accept());
    }

    #[test]
    fn has_scope_checks_allowed_list() {
        let e = employee(HashMap::new());
        assert!(e.has_scope(Scope::Waiter));
        assert!(!e.has_scope(Scope::Admin));
    }

    #[test]
    fn is_signed_in_requires_recent_activity() {
        let mut e = employee(HashMap::new());
        let now = chrono::Utc::now();
        e.signed_in_at = Some(now - chrono::Duration::hours(2));
        e.last_activity_at = Some(now - chrono::Duration::minutes(5));
        assert!(e.is_signed_in(chrono::Duration::minutes(30), now));

        e.last_activity_at = Some(now - chrono::Duration::hours(1));
        assert!(!e.is_signed_in(chrono::Duration::minutes(30), now));
    }

    #[test]
    fn is_signed_in_false_when_never_signed_in() {
        let e = employee(HashMap::new());
        assert!(!e.is_signed_in(chrono::Duration::hours(1), chrono::Utc::now()));
    }
}
