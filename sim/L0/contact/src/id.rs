//! Contact point identity.
//!
//! A [`ContactId`] names the pair of geometric features that produced a
//! point. It is an equality key only: two points with the same id in
//! consecutive frames are the same physical contact, so their accumulated
//! impulses carry over.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Feature index meaning "no feature".
pub const NULL_FEATURE: u8 = u8::MAX;

/// The features that produced a contact point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactFeatures {
    /// Edge on the reference shape.
    pub reference_edge: u8,
    /// Edge on the incident shape.
    pub incident_edge: u8,
    /// Vertex on the incident shape.
    pub incident_vertex: u8,
    /// Non-zero when the shapes were swapped to pick the reference face.
    pub flip: u8,
}

impl ContactFeatures {
    /// Features with every index unset.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            reference_edge: NULL_FEATURE,
            incident_edge: NULL_FEATURE,
            incident_vertex: NULL_FEATURE,
            flip: 0,
        }
    }
}

impl Default for ContactFeatures {
    fn default() -> Self {
        Self::null()
    }
}

/// Packed [`ContactFeatures`].
///
/// Byte 0 is `flip`, then `incident_edge`, `incident_vertex` and
/// `reference_edge` in the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactId(pub u32);

impl ContactId {
    /// Pack features into a key.
    #[must_use]
    pub const fn from_features(f: ContactFeatures) -> Self {
        Self(u32::from_le_bytes([
            f.flip,
            f.incident_edge,
            f.incident_vertex,
            f.reference_edge,
        ]))
    }

    /// Unpack the features.
    #[must_use]
    pub const fn features(self) -> ContactFeatures {
        let [flip, incident_edge, incident_vertex, reference_edge] = self.0.to_le_bytes();
        ContactFeatures {
            reference_edge,
            incident_edge,
            incident_vertex,
            flip,
        }
    }

    /// The raw key.
    #[must_use]
    pub const fn key(self) -> u32 {
        self.0
    }
}

impl From<ContactFeatures> for ContactId {
    fn from(features: ContactFeatures) -> Self {
        Self::from_features(features)
    }
}
