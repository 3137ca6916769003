//! Linear movement toward per-entity destinations.
//!
//! A [`Mover`] advances every entity with an active destination by
//! `speed * elapsed` each tick and reports who moved and who arrived, so the
//! caller can feed those entities back into the spatial index.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use sightline_aoi::{EntityGuid, VisionEntity};

/// An entity the [`Mover`] can reposition.
pub trait MovingEntity: VisionEntity {
    /// Movement speed in plane units per second.
    fn speed(&self) -> f64;

    /// Overwrite the entity's position.
    fn set_position(&self, position: DVec2);
}

impl<T: MovingEntity + ?Sized> MovingEntity for Arc<T> {
    fn speed(&self) -> f64 {
        (**self).speed()
    }

    fn set_position(&self, position: DVec2) {
        (**self).set_position(position);
    }
}

/// Outcome of one [`Mover::tick`] for a single entity.
#[derive(Debug, Clone)]
pub enum MovementEvent<E> {
    /// The entity stepped toward its destination.
    Moved {
        /// The moving entity.
        entity: E,
        /// Position before this step.
        from: DVec2,
    },
    /// The entity reached its destination and stopped.
    Arrived {
        /// The entity that arrived.
        entity: E,
    },
}

impl<E> MovementEvent<E> {
    /// The entity this event concerns.
    pub fn entity(&self) -> &E {
        match self {
            Self::Moved { entity, .. } | Self::Arrived { entity } => entity,
        }
    }
}

struct Destination<E> {
    entity: E,
    target: DVec2,
}

/// Drives entities toward their destinations in straight lines.
pub struct Mover<E> {
    destinations: BTreeMap<EntityGuid, Destination<E>>,
}

impl<E> Default for Mover<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Mover<E> {
    /// Create a mover with no active destinations.
    pub fn new() -> Self {
        Self {
            destinations: BTreeMap::new(),
        }
    }

    /// Number of entities currently moving.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Returns `true` if nobody is moving.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Returns `true` if `guid` has an active destination.
    pub fn is_moving(&self, guid: EntityGuid) -> bool {
        self.destinations.contains_key(&guid)
    }

    /// Cancel movement of `guid`. Returns `false` if it was not moving.
    pub fn stop(&mut self, guid: EntityGuid) -> bool {
        self.destinations.remove(&guid).is_some()
    }
}

impl<E: MovingEntity + Clone> Mover<E> {
    /// Start moving `entity` toward `target`, replacing any previous destination.
    pub fn move_to(&mut self, entity: E, target: DVec2) {
        self.destinations
            .insert(entity.guid(), Destination { entity, target });
    }

    /// Advance every moving entity by `elapsed`.
    ///
    /// Entities whose remaining distance fits in this step snap to their
    /// destination and are dropped. An entity with a non-positive speed never
    /// arrives and produces no events.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<MovementEvent<E>> {
        let seconds = elapsed.as_secs_f64();
        if seconds <= 0.0 {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut arrived = Vec::new();
        for (guid, destination) in &self.destinations {
            let entity = &destination.entity;
            let from = entity.position();
            let remaining = from.distance(destination.target);
            let step = entity.speed() * seconds;

            if from == destination.target || (step > 0.0 && step >= remaining) {
                entity.set_position(destination.target);
                arrived.push(*guid);
                events.push(MovementEvent::Arrived {
                    entity: entity.clone(),
                });
            } else if step > 0.0 {
                let direction = (destination.target - from) / remaining;
                entity.set_position(from + direction * step);
                events.push(MovementEvent::Moved {
                    entity: entity.clone(),
                    from,
                });
            }
        }

        for guid in arrived {
            self.destinations.remove(&guid);
        }
        events
    }
}
