//! Authorization scopes
//!
//! A [`Scope`] is the authorization *window* an actor is currently operating
//! in — not their role. An employee's role describes what they are; the
//! scope describes the API surface they're acting through right now. The
//! transition policy table in `core::orders::transition` is keyed on scope,
//! never on role directly.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Client,
    Waiter,
    Chef,
    Cashier,
    Admin,
    System,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Client,
        Scope::Waiter,
        Scope::Chef,
        Scope::Cashier,
        Scope::Admin,
        Scope::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Client => "client",
            Scope::Waiter => "waiter",
            Scope::Chef => "chef",
            Scope::Cashier => "cashier",
            Scope::Admin => "admin",
            Scope::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Scope::Client),
            "waiter" => Some(Scope::Waiter),
            "chef" => Some(Scope::Chef),
            "cashier" => Some(Scope::Cashier),
            "admin" => Some(Scope::Admin),
            "system" => Some(Scope::System),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor taking an action, as handed to the core by the
/// (out-of-scope) authentication layer: an id plus the scope it is currently
/// acting within. `actor_id` is `None` for the `client` scope, which acts on
/// behalf of an unauthenticated guest rather than an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub scope: Scope,
    pub employee_id: Option<i64>,
}

impl Actor {
    pub fn new(scope: Scope, employee_id: Option<i64>) -> Self {
        Self { scope, employee_id }
    }

    pub fn system() -> Self {
        Self {
            scope: Scope::System,
            employee_id: None,
        }
    }

    pub fn client() -> Self {
        Self {
            scope: Scope::Client,
            employee_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_snake_case() {
        assert_eq!(Scope::Cashier.to_string(), "cashier");
    }
}
