//! User roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried in the identity token.
///
/// Every staff capability check in the server is expressed as a set of
/// these roles; there is no per-user permission list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
    Finance,
    Inventory,
    QualityCheck,
    Dispatch,
    Driver,
    Technician,
    Supplier,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Customer,
        Role::Admin,
        Role::Finance,
        Role::Inventory,
        Role::QualityCheck,
        Role::Dispatch,
        Role::Driver,
        Role::Technician,
        Role::Supplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Finance => "finance",
            Role::Inventory => "inventory",
            Role::QualityCheck => "quality_check",
            Role::Dispatch => "dispatch",
            Role::Driver => "driver",
            Role::Technician => "technician",
            Role::Supplier => "supplier",
        }
    }

    /// Anyone who is not a customer works for the shop (or supplies it)
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role name in a token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
