//! Entity identity and the accessors the index reads from tracked entities.

use std::fmt;
use std::sync::Arc;

use glam::DVec2;

/// Stable unique identifier of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityGuid(pub i64);

impl EntityGuid {
    /// Create a new guid from an i64.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityGuid {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trait that entities tracked by the [`SpatialIndex`](crate::SpatialIndex)
/// must implement.
///
/// The index never owns entity state. It stores cloned handles (usually
/// `Arc<T>`) and re-reads position and vision through this trait every time
/// it evaluates visibility.
pub trait VisionEntity {
    /// Return the unique ID of this entity.
    fn guid(&self) -> EntityGuid;

    /// Return the entity's current position on the plane.
    fn position(&self) -> DVec2;

    /// Return the maximum distance at which this entity perceives others.
    fn vision(&self) -> f64;
}

impl<T: VisionEntity + ?Sized> VisionEntity for Arc<T> {
    fn guid(&self) -> EntityGuid {
        (**self).guid()
    }

    fn position(&self) -> DVec2 {
        (**self).position()
    }

    fn vision(&self) -> f64 {
        (**self).vision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    impl VisionEntity for Marker {
        fn guid(&self) -> EntityGuid {
            EntityGuid::new(7)
        }

        fn position(&self) -> DVec2 {
            DVec2::new(1.0, 2.0)
        }

        fn vision(&self) -> f64 {
            3.0
        }
    }

    #[test]
    fn test_guid_creation_and_access() {
        let guid = EntityGuid::new(12345);
        assert_eq!(guid.value(), 12345);
        assert_eq!(EntityGuid::from(12345), guid);
        assert_eq!(guid.to_string(), "#12345");
    }

    #[test]
    fn test_arc_forwards_accessors() {
        let shared: Arc<Marker> = Arc::new(Marker);
        assert_eq!(shared.guid(), EntityGuid::new(7));
        assert_eq!(shared.position(), DVec2::new(1.0, 2.0));
        assert_eq!(shared.vision(), 3.0);
    }
}
