//! The spatial index: grid placement, focus sets, and their incremental
//! maintenance.
//!
//! All state lives behind one [`RwLock`]. Mutations hold the write lock for
//! their whole duration, including every handler they fire; queries take the
//! read lock and hand back copies.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use glam::DVec2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::entity::{EntityGuid, VisionEntity};
use crate::error::AoiError;
use crate::events::VisionEvents;
use crate::grid::{CellCoord, Grid, within_vision};
use crate::settings::AoiSettings;

/// Copy of one entity's focus set: everyone it currently perceives.
pub type FocusSet<E> = FxHashMap<EntityGuid, E>;

// ---------------------------------------------------------------------------
// IndexState
// ---------------------------------------------------------------------------

struct IndexState<E> {
    settings: AoiSettings,
    grid: Grid<E>,
    /// Cell each entity was placed in; removal never re-derives it from a
    /// position that may have drifted since.
    placements: FxHashMap<EntityGuid, CellCoord>,
    /// observer -> observed.
    focus: FxHashMap<EntityGuid, FocusSet<E>>,
    /// observed -> observers. Mirror of `focus`.
    observers: FxHashMap<EntityGuid, FxHashSet<EntityGuid>>,
    events: VisionEvents<E>,
}

fn grid_for<E>(settings: &AoiSettings) -> Result<Grid<E>, AoiError> {
    let (columns, rows) = settings.grid_dimensions()?;
    Ok(Grid::new(
        columns,
        rows,
        DVec2::new(settings.cell_width, settings.cell_height),
    ))
}

impl<E: VisionEntity + Clone> IndexState<E> {
    fn new(settings: AoiSettings) -> Result<Self, AoiError> {
        Ok(Self {
            grid: grid_for(&settings)?,
            settings,
            placements: FxHashMap::default(),
            focus: FxHashMap::default(),
            observers: FxHashMap::default(),
            events: VisionEvents::new(),
        })
    }

    /// Record `observed` in the focus set of `observer`. Returns `false` if it
    /// was already there (or `observer` has no focus set).
    fn link(&mut self, observer: EntityGuid, observed: &E) -> bool {
        let observed_guid = observed.guid();
        let Some(focus) = self.focus.get_mut(&observer) else {
            return false;
        };
        if focus.contains_key(&observed_guid) {
            return false;
        }
        focus.insert(observed_guid, observed.clone());
        self.observers
            .entry(observed_guid)
            .or_default()
            .insert(observer);
        true
    }

    /// Drop `observed` from the focus set of `observer`, returning the
    /// removed handle.
    fn unlink(&mut self, observer: EntityGuid, observed: EntityGuid) -> Option<E> {
        let removed = self.focus.get_mut(&observer)?.remove(&observed)?;
        if let Some(watchers) = self.observers.get_mut(&observed) {
            watchers.remove(&observer);
            if watchers.is_empty() {
                self.observers.remove(&observed);
            }
        }
        Some(removed)
    }

    fn add_entity(&mut self, entity: E) {
        let guid = entity.guid();
        if self.placements.contains_key(&guid) {
            tracing::debug!("AOI re-insert of {}, removing previous placement", guid);
            self.delete_entity(guid);
        }

        let position = entity.position();
        if !self.grid.covers(position) {
            tracing::warn!(
                "AOI entity {} at ({}, {}) is outside the {}x{} plane, clamping to border cell",
                guid,
                position.x,
                position.y,
                self.settings.width,
                self.settings.height
            );
        }
        let coord = self.grid.cell_coord(position);
        self.grid.insert(coord, guid, entity.clone());
        self.placements.insert(guid, coord);
        self.focus.insert(guid, FocusSet::default());
        tracing::debug!("AOI add {} at cell ({}, {})", guid, coord.x, coord.y);

        let candidates = self
            .grid
            .visible_entities(guid, position, entity.vision());
        for candidate in candidates {
            if self.link(guid, &candidate) {
                self.events.emit_join(&entity, &candidate);
                // Lets the candidate discover the newcomer from its own side.
                self.refresh(&candidate);
            }
        }
    }

    fn delete_entity(&mut self, guid: EntityGuid) -> bool {
        let Some(coord) = self.placements.remove(&guid) else {
            return false;
        };
        let removed = self.grid.remove(coord, guid);
        let focus = self.focus.remove(&guid).unwrap_or_default();

        for (other_guid, other) in focus {
            if let Some(watchers) = self.observers.get_mut(&other_guid) {
                watchers.remove(&guid);
                if watchers.is_empty() {
                    self.observers.remove(&other_guid);
                }
            }
            let mutual = self.unlink(other_guid, guid).is_some();
            if let Some(entity) = &removed {
                self.events.emit_leave(entity, &other);
                self.events.emit_leave(&other, entity);
            }
            tracing::trace!("AOI {} left vision of {} (mutual: {})", guid, other_guid, mutual);
        }

        // Observers that saw the removed entity without being seen back.
        let watchers: Vec<EntityGuid> = self
            .observers
            .remove(&guid)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for watcher in watchers {
            let Some(focus) = self.focus.get_mut(&watcher) else {
                continue;
            };
            focus.remove(&guid);
            if let (Some(entity), Some(observer)) = (&removed, self.grid_entity(watcher)) {
                self.events.emit_leave(&observer, entity);
            }
        }

        tracing::debug!("AOI delete {} from cell ({}, {})", guid, coord.x, coord.y);
        true
    }

    /// Handle of a placed entity, looked up through its recorded cell.
    fn grid_entity(&self, guid: EntityGuid) -> Option<E> {
        let coord = self.placements.get(&guid)?;
        self.grid.get(*coord, guid).cloned()
    }

    fn refresh(&mut self, entity: &E) {
        let guid = entity.guid();
        let Some(focus) = self.focus.get(&guid) else {
            return;
        };
        let position = entity.position();
        let vision = entity.vision();

        let stale: Vec<EntityGuid> = focus
            .iter()
            .filter(|(_, other)| !within_vision(position, other.position(), vision))
            .map(|(other_guid, _)| *other_guid)
            .collect();
        for other_guid in stale {
            let Some(other) = self.unlink(guid, other_guid) else {
                continue;
            };
            let mutual = self.unlink(other_guid, guid).is_some();
            if self.settings.leave_on_refresh {
                self.events.emit_leave(entity, &other);
                if mutual {
                    self.events.emit_leave(&other, entity);
                }
            }
            tracing::trace!("AOI {} lost sight of {}", guid, other_guid);
        }

        let candidates = self.grid.visible_entities(guid, position, vision);
        for candidate in candidates {
            if self.link(guid, &candidate) {
                tracing::trace!("AOI {} gained sight of {}", guid, candidate.guid());
                self.events.emit_join(entity, &candidate);
            }
        }
    }

    fn move_entity(&mut self, entity: &E) {
        let guid = entity.guid();
        let Some(&old) = self.placements.get(&guid) else {
            return;
        };
        let new = self.grid.cell_coord(entity.position());
        if new != old {
            if let Some(handle) = self.grid.remove(old, guid) {
                self.grid.insert(new, guid, handle);
            }
            self.placements.insert(guid, new);
            tracing::debug!(
                "AOI relocate {} from cell ({}, {}) to ({}, {})",
                guid,
                old.x,
                old.y,
                new.x,
                new.y
            );
        }
        self.refresh(entity);
    }

    /// Tear everything down and re-insert it under `settings`. The new grid
    /// is allocated before anything is removed, so an error leaves the index
    /// untouched.
    fn rebuild(&mut self, settings: AoiSettings) -> Result<(), AoiError> {
        let grid = grid_for(&settings)?;

        let snapshot = self.grid.snapshot();
        for entity in &snapshot {
            self.delete_entity(entity.guid());
        }

        self.settings = settings;
        self.grid = grid;
        let (columns, rows) = self.grid.dimensions();
        tracing::info!(
            "AOI rebuild: plane {}x{}, cell {}x{}, grid {}x{}, {} entities",
            settings.width,
            settings.height,
            settings.cell_width,
            settings.cell_height,
            columns,
            rows,
            snapshot.len()
        );

        for entity in snapshot {
            self.add_entity(entity);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SpatialIndex
// ---------------------------------------------------------------------------

/// Thread-safe two-dimensional area-of-interest index.
///
/// Tracks entities on a bounded plane partitioned into uniform cells and
/// keeps, for each of them, the set of other entities within its vision
/// radius. Registered handlers are told whenever an entity enters or leaves
/// another entity's focus set.
///
/// Handlers run while the index is write-locked. Calling back into the same
/// index from a handler deadlocks.
///
/// ```
/// use std::sync::Arc;
/// use glam::DVec2;
/// use sightline_aoi::{AoiSettings, EntityGuid, SpatialIndex, VisionEntity};
///
/// struct Npc(i64, DVec2);
///
/// impl VisionEntity for Npc {
///     fn guid(&self) -> EntityGuid { EntityGuid::new(self.0) }
///     fn position(&self) -> DVec2 { self.1 }
///     fn vision(&self) -> f64 { 60.0 }
/// }
///
/// let index = SpatialIndex::new(AoiSettings::default()).unwrap();
/// index.add_entity(Arc::new(Npc(1, DVec2::new(50.0, 50.0))));
/// index.add_entity(Arc::new(Npc(2, DVec2::new(100.0, 50.0))));
///
/// assert!(index.get_focus(EntityGuid::new(1)).contains_key(&EntityGuid::new(2)));
/// assert!(index.get_focus(EntityGuid::new(2)).contains_key(&EntityGuid::new(1)));
/// ```
pub struct SpatialIndex<E> {
    state: RwLock<IndexState<E>>,
}

impl<E: VisionEntity + Clone> SpatialIndex<E> {
    /// Create an empty index. Fails if any dimension is not finite and
    /// positive, or if the grid would exceed [`MAX_GRID_CELLS`](crate::MAX_GRID_CELLS).
    pub fn new(settings: AoiSettings) -> Result<Self, AoiError> {
        Ok(Self {
            state: RwLock::new(IndexState::new(settings)?),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState<E>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler fired as `(observer, observed)` when `observed`
    /// enters the focus set of `observer`.
    pub fn on_entity_join_vision<F>(&self, handler: F)
    where
        F: Fn(&E, &E) + Send + Sync + 'static,
    {
        self.write().events.register_join(handler);
    }

    /// Register a handler fired as `(observer, observed)` when `observed`
    /// leaves the focus set of `observer`.
    pub fn on_entity_leave_vision<F>(&self, handler: F)
    where
        F: Fn(&E, &E) + Send + Sync + 'static,
    {
        self.write().events.register_leave(handler);
    }

    /// Insert `entity` at its current position and build its focus set.
    ///
    /// Fires a join event for every entity it can see, then refreshes each of
    /// them so they may pick the newcomer up in turn. An entity already
    /// present under the same guid is deleted first.
    pub fn add_entity(&self, entity: E) {
        self.write().add_entity(entity);
    }

    /// Remove `entity` from the grid and from every focus set.
    pub fn delete_entity(&self, entity: &E) {
        self.delete_entity_by_guid(entity.guid());
    }

    /// Remove the entity with `guid`. Returns `false` if it was not tracked.
    ///
    /// For each member of its focus set, leave fires in both directions.
    /// Entities that could see it without being seen back get a leave event
    /// as observers.
    pub fn delete_entity_by_guid(&self, guid: EntityGuid) -> bool {
        self.write().delete_entity(guid)
    }

    /// Re-evaluate the focus set of `entity` against its current position and
    /// vision. Cell membership is left untouched; use
    /// [`move_entity`](Self::move_entity) after a position change.
    ///
    /// Unknown entities are ignored.
    pub fn refresh(&self, entity: &E) {
        self.write().refresh(entity);
    }

    /// Move `entity` to the cell matching its current position, then refresh it.
    pub fn move_entity(&self, entity: &E) {
        self.write().move_entity(entity);
    }

    /// Copy of the focus set of `guid`. Empty for unknown entities.
    pub fn get_focus(&self, guid: EntityGuid) -> FocusSet<E> {
        self.read().focus.get(&guid).cloned().unwrap_or_default()
    }

    /// Sorted guids of the focus set of `guid`.
    pub fn focus_guids(&self, guid: EntityGuid) -> Vec<EntityGuid> {
        let mut guids: Vec<EntityGuid> = self
            .read()
            .focus
            .get(&guid)
            .map(|focus| focus.keys().copied().collect())
            .unwrap_or_default();
        guids.sort();
        guids
    }

    /// Resize the tracked plane. No-op when unchanged; otherwise every focus
    /// set is rebuilt, firing leave then join events. Invalid dimensions are
    /// rejected before any entity is touched.
    pub fn set_size(&self, width: f64, height: f64) -> Result<(), AoiError> {
        let mut state = self.write();
        if state.settings.width == width && state.settings.height == height {
            return Ok(());
        }
        let settings = AoiSettings {
            width,
            height,
            ..state.settings
        };
        state.rebuild(settings)
    }

    /// Resize the grid cells. No-op when unchanged; otherwise every focus set
    /// is rebuilt, firing leave then join events. Invalid dimensions are
    /// rejected before any entity is touched.
    pub fn set_area_size(&self, cell_width: f64, cell_height: f64) -> Result<(), AoiError> {
        let mut state = self.write();
        if state.settings.cell_width == cell_width && state.settings.cell_height == cell_height {
            return Ok(());
        }
        let settings = AoiSettings {
            cell_width,
            cell_height,
            ..state.settings
        };
        state.rebuild(settings)
    }

    /// Current dimensions and event policy.
    pub fn settings(&self) -> AoiSettings {
        self.read().settings
    }

    /// Number of grid `(columns, rows)`.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        self.read().grid.dimensions()
    }

    /// Returns `true` if an entity with `guid` is tracked.
    pub fn contains(&self, guid: EntityGuid) -> bool {
        self.read().placements.contains_key(&guid)
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.read().placements.len()
    }

    /// Returns `true` if no entities are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
