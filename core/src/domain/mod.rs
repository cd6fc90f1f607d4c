//! Domain types shared between the repository layer and the engines.
//!
//! These are the in-process representations of the entities in the data
//! model: plain structs with `sqlx::FromRow` derives for the ones read
//! straight off a row, and hand-written `Serialize`/`Deserialize` where the
//! wire shape differs from the storage shape (money fields, enums).

pub mod area;
pub mod assignment;
pub mod customer;
pub mod employee;
pub mod modification;
pub mod order;
pub mod session;
pub mod split_bill;
pub mod table;
pub mod waiter_call;

pub use area::Area;
pub use assignment::{TableTransferRequest, TransferStatus, WaiterTableAssignment};
pub use customer::Customer;
pub use employee::Employee;
pub use modification::{ModificationInitiator, ModificationStatus, OrderModification};
pub use order::{Order, OrderItem, OrderItemModifier, OrderStatus, PaymentStatus};
pub use session::{DiningSession, SessionStatus};
pub use split_bill::{SplitAssignment, SplitBill, SplitPerson, SplitStatus, SplitType};
pub use table::{Table, TableStatus};
pub use waiter_call::{WaiterCall, WaiterCallStatus};

use serde::{Deserialize, Serialize};

/// The enumerated payment methods from §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Stripe,
    Clip,
    /// Assigned to child orders/session when a split bill completes —
    /// never a method a caller selects directly (§4.4).
    SplitBill,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Stripe => "stripe",
            Self::Clip => "clip",
            Self::SplitBill => "split_bill",
        }
    }

    /// `cash`/`card` require a cashier confirmation step; `stripe`/`clip`
    /// settle immediately.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Cash | Self::Card)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "stripe" => Some(Self::Stripe),
            "clip" => Some(Self::Clip),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_and_card_require_confirmation() {
        assert!(PaymentMethod::Cash.requires_confirmation());
        assert!(PaymentMethod::Card.requires_confirmation());
        assert!(!PaymentMethod::Stripe.requires_confirmation());
        assert!(!PaymentMethod::Clip.requires_confirmation());
        assert!(!PaymentMethod::SplitBill.requires_confirmation());
    }

    #[test]
    fn parse_rejects_split_bill_as_a_caller_selectable_method() {
        // split_bill is only ever assigned internally when a split completes,
        // never something a caller picks from the wire.
        assert_eq!(PaymentMethod::parse("split_bill"), None);
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("bogus"), None);
    }
}
