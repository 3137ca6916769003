//! Headless wandering simulation on top of the AOI index.
//!
//! Agents spawn at seeded random positions and repeatedly walk to random
//! destinations. Every step of the [`Mover`] is fed back into the
//! [`SpatialIndex`], whose join/leave handlers keep running totals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sightline_aoi::{AoiError, AoiSettings, EntityGuid, SpatialIndex, VisionEntity};
use sightline_config::{AoiConfig, Config, ConfigError};

use crate::movement::{MovementEvent, MovingEntity, Mover};

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A wandering entity.
#[derive(Debug)]
pub struct Agent {
    guid: EntityGuid,
    position: Mutex<DVec2>,
    vision: f64,
    speed: f64,
}

impl Agent {
    pub fn new(id: i64, position: DVec2, vision: f64, speed: f64) -> Self {
        Self {
            guid: EntityGuid::new(id),
            position: Mutex::new(position),
            vision,
            speed,
        }
    }
}

impl VisionEntity for Agent {
    fn guid(&self) -> EntityGuid {
        self.guid
    }

    fn position(&self) -> DVec2 {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn vision(&self) -> f64 {
        self.vision
    }
}

impl MovingEntity for Agent {
    fn speed(&self) -> f64 {
        self.speed
    }

    fn set_position(&self, position: DVec2) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }
}

// ---------------------------------------------------------------------------
// Errors / reports
// ---------------------------------------------------------------------------

/// Reasons a simulation cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Aoi(#[from] AoiError),
}

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Agents that stepped without arriving.
    pub moved: usize,
    /// Agents that reached their destination.
    pub arrived: usize,
    /// Join events fired during this tick.
    pub joins: u64,
    /// Leave events fired during this tick.
    pub leaves: u64,
    /// Mean focus-set size after the tick.
    pub average_focus: f64,
}

#[derive(Debug, Default)]
struct VisionCounters {
    joins: AtomicU64,
    leaves: AtomicU64,
}

/// Index settings described by an [`AoiConfig`] section.
pub fn aoi_settings(config: &AoiConfig) -> AoiSettings {
    AoiSettings::new(
        config.width,
        config.height,
        config.cell_width,
        config.cell_height,
    )
    .with_leave_on_refresh(config.leave_on_refresh)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Agents, the index tracking them, and the mover driving them.
pub struct Simulation {
    index: SpatialIndex<Arc<Agent>>,
    mover: Mover<Arc<Agent>>,
    agents: Vec<Arc<Agent>>,
    counters: Arc<VisionCounters>,
    rng: ChaCha8Rng,
    bounds: DVec2,
    tick_interval: Duration,
    tick: u64,
}

impl Simulation {
    /// Build a simulation from a validated config and spawn its agents.
    pub fn new(config: &Config) -> Result<Self, SimulationError> {
        config.validate()?;
        let index: SpatialIndex<Arc<Agent>> = SpatialIndex::new(aoi_settings(&config.aoi))?;

        let counters = Arc::new(VisionCounters::default());
        let joins = Arc::clone(&counters);
        index.on_entity_join_vision(move |_, _| {
            joins.joins.fetch_add(1, Ordering::Relaxed);
        });
        let leaves = Arc::clone(&counters);
        index.on_entity_leave_vision(move |_, _| {
            leaves.leaves.fetch_add(1, Ordering::Relaxed);
        });

        let sim = &config.simulation;
        let bounds = DVec2::new(config.aoi.width, config.aoi.height);
        let mut rng = ChaCha8Rng::seed_from_u64(sim.seed);
        let agents: Vec<Arc<Agent>> = (0..i64::from(sim.entity_count))
            .map(|id| {
                let position = random_point(&mut rng, bounds);
                Arc::new(Agent::new(id, position, sim.vision, sim.speed))
            })
            .collect();
        for agent in &agents {
            index.add_entity(Arc::clone(agent));
        }
        tracing::info!(
            "Spawned {} agents on a {}x{} plane (grid {:?})",
            agents.len(),
            bounds.x,
            bounds.y,
            index.grid_dimensions()
        );

        Ok(Self {
            index,
            mover: Mover::new(),
            agents,
            counters,
            rng,
            bounds,
            tick_interval: Duration::from_millis(sim.tick_interval_ms),
            tick: 0,
        })
    }

    pub fn index(&self) -> &SpatialIndex<Arc<Agent>> {
        &self.index
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    /// Total `(joins, leaves)` fired since the simulation was built.
    pub fn totals(&self) -> (u64, u64) {
        (
            self.counters.joins.load(Ordering::Relaxed),
            self.counters.leaves.load(Ordering::Relaxed),
        )
    }

    /// Give idle agents a new destination, advance the mover by one tick
    /// interval, and push every moved agent through the index.
    pub fn step(&mut self) -> TickReport {
        let (joins_before, leaves_before) = self.totals();
        self.tick += 1;

        for agent in &self.agents {
            if !self.mover.is_moving(agent.guid()) {
                let target = random_point(&mut self.rng, self.bounds);
                self.mover.move_to(Arc::clone(agent), target);
            }
        }

        let events = self.mover.tick(self.tick_interval);
        let mut moved = 0;
        let mut arrived = 0;
        for event in &events {
            match event {
                MovementEvent::Moved { .. } => moved += 1,
                MovementEvent::Arrived { .. } => arrived += 1,
            }
            self.index.move_entity(event.entity());
        }

        let (joins, leaves) = self.totals();
        let report = TickReport {
            tick: self.tick,
            moved,
            arrived,
            joins: joins - joins_before,
            leaves: leaves - leaves_before,
            average_focus: self.average_focus(),
        };
        tracing::debug!("Tick {report:?}");
        report
    }

    /// Mean focus-set size over all agents.
    pub fn average_focus(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .agents
            .iter()
            .map(|agent| self.index.get_focus(agent.guid()).len())
            .sum();
        total as f64 / self.agents.len() as f64
    }
}

fn random_point(rng: &mut ChaCha8Rng, bounds: DVec2) -> DVec2 {
    DVec2::new(rng.random_range(0.0..bounds.x), rng.random_range(0.0..bounds.y))
}
