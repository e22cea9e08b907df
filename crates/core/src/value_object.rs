//! Value object trait: equality by value, not identity.
//!
//! A parcel is an entity (its number identifies it across status changes); its
//! delivery address is a value object. Changing the address replaces the value,
//! it never edits it in place.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Constructors are
/// expected to validate, so holding an instance means the value is well-formed.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct DeliveryAddress(String);
///
/// impl ValueObject for DeliveryAddress {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
