use serde::{Deserialize, Serialize};

use parceltrack_core::{DomainError, ValueObject};

/// Free-text delivery address. Never empty.
///
/// The text is kept exactly as supplied; only the empty string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeliveryAddress(String);

impl DeliveryAddress {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::validation("address cannot be empty"));
        }
        Ok(Self(value))
    }

    /// Wrap an address read back from storage without re-validating it.
    ///
    /// Rows are written through `parse`, so the stored text is trusted as is.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for DeliveryAddress {}

impl core::fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeliveryAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DeliveryAddress> for String {
    fn from(value: DeliveryAddress) -> Self {
        value.0
    }
}
