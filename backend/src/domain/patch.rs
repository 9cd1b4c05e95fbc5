//! Tri-state patch field for update requests.
//!
//! JSON cannot distinguish "field omitted" from "field: null" through a
//! plain `Option`, but the update contract needs both: an omitted
//! `assignedUserId` leaves the assignment alone while an explicit null
//! unassigns the incident.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A field in a patch-style request: absent, explicitly null, or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field was not present in the request; leave the current value.
    #[default]
    Missing,
    /// Field was present as an explicit null; clear the current value.
    Null,
    /// Field was present with a value; replace the current value.
    Value(T),
}

impl<T> Patch<T> {
    /// Whether the field was omitted entirely.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Apply this patch over `current`, returning the resulting value.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Missing => current,
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Deserializer hook: a present field maps null to [`Patch::Null`] and a
    /// value to [`Patch::Value`]. Pair with `#[serde(default)]` so an absent
    /// field stays [`Patch::Missing`].
    ///
    /// # Errors
    /// Propagates deserialization failures for the inner value.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(inner) => Self::Value(inner),
            None => Self::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Missing fields are skipped at the struct level via
        // `skip_serializing_if = "Patch::is_missing"`; serializing one
        // anyway degrades to null.
        match self {
            Self::Missing | Self::Null => serializer.serialize_none(),
            Self::Value(value) => serializer.serialize_some(value),
        }
    }
}
