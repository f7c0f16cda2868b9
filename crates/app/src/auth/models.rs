//! Caller identity models.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Role claim carried by a verified identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Customer,
    Seller,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("customer") {
            Ok(Self::Customer)
        } else if value.eq_ignore_ascii_case("seller") {
            Ok(Self::Seller)
        } else {
            Err(UnknownRole)
        }
    }
}

/// Role claim did not name a known role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown role claim")]
pub struct UnknownRole;

/// Verified identity of the caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: UserId,
    pub email: Option<String>,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub fn customer(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            email: None,
            role: Role::Customer,
        }
    }

    #[must_use]
    pub fn seller(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            email: None,
            role: Role::Seller,
        }
    }
}
