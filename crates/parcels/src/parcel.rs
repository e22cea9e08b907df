use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parceltrack_core::{ClientId, DomainError, Entity, ParcelNumber};

use crate::address::DeliveryAddress;

/// Parcel status lifecycle: `registered` → `sent` → `delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParcelStatus {
    Registered,
    Sent,
    Delivered,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 3] = [
        ParcelStatus::Registered,
        ParcelStatus::Sent,
        ParcelStatus::Delivered,
    ];

    /// Storage/wire literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Registered => "registered",
            ParcelStatus::Sent => "sent",
            ParcelStatus::Delivered => "delivered",
        }
    }

    /// Whether an explicit status update may set this value.
    ///
    /// `registered` is only ever assigned at creation.
    pub fn is_update_target(&self) -> bool {
        matches!(self, ParcelStatus::Sent | ParcelStatus::Delivered)
    }

    /// Validate `self` as the target of an explicit status update.
    pub fn ensure_update_target(self) -> Result<Self, DomainError> {
        if self.is_update_target() {
            Ok(self)
        } else {
            Err(DomainError::validation(format!(
                "status cannot be set to '{}'; expected 'sent' or 'delivered'",
                self
            )))
        }
    }
}

impl core::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(ParcelStatus::Registered),
            "sent" => Ok(ParcelStatus::Sent),
            "delivered" => Ok(ParcelStatus::Delivered),
            other => Err(DomainError::validation(format!("invalid status: '{other}'"))),
        }
    }
}

/// A tracked shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: DeliveryAddress,
    pub created_at: DateTime<Utc>,
}

impl Entity for Parcel {
    type Id = ParcelNumber;

    fn id(&self) -> Self::Id {
        self.number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_parcel(status: ParcelStatus) -> Parcel {
        Parcel {
            number: ParcelNumber::new(1),
            client: ClientId::new(1),
            status,
            address: DeliveryAddress::parse("Main St 1").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_literals_match_storage_format() {
        for status in ParcelStatus::ALL {
            assert_eq!(status.as_str().parse::<ParcelStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&ParcelStatus::Delivered).unwrap(),
            "\"delivered\""
        );
    }

    #[test]
    fn unknown_status_literal_is_a_validation_error() {
        for literal in ["", "Sent", "lost", "registered "] {
            assert!(matches!(
                literal.parse::<ParcelStatus>(),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn registered_is_not_an_update_target() {
        assert!(matches!(
            ParcelStatus::Registered.ensure_update_target(),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(ParcelStatus::Sent.ensure_update_target(), Ok(ParcelStatus::Sent));
        assert_eq!(
            ParcelStatus::Delivered.ensure_update_target(),
            Ok(ParcelStatus::Delivered)
        );
    }

    #[test]
    fn entity_id_is_the_parcel_number() {
        assert_eq!(test_parcel(ParcelStatus::Sent).id(), ParcelNumber::new(1));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: only the three lowercase literals parse.
            #[test]
            fn arbitrary_literals_parse_only_when_known(literal in "[a-zA-Z ]{0,12}") {
                let known = matches!(literal.as_str(), "registered" | "sent" | "delivered");
                prop_assert_eq!(literal.parse::<ParcelStatus>().is_ok(), known);
            }
        }
    }
}
