//! Headless driver for the Sightline AOI index.
//!
//! [`movement`] walks entities toward destinations; [`simulation`] wires a
//! population of wandering agents into a [`sightline_aoi::SpatialIndex`] and
//! reports the visibility churn every tick.

pub mod movement;
pub mod simulation;

pub use movement::{MovementEvent, Mover, MovingEntity};
pub use simulation::{Agent, Simulation, SimulationError, TickReport};
