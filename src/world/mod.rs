//! The two seams through which the engine touches the game: a read-only
//! entity query surface and an action handler that performs mutations.
//!
//! The engine never owns game entities. It holds [`EntityId`] handles issued
//! by the world; the world is free to kill an entity at any time, after which
//! every query for that handle answers `None`.

/// Opaque handle to a live (or formerly live) game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Team membership of a worm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Worm,
    Food,
}

/// Entity selector used by `for-each` statements and by searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFilter {
    Worm,
    Food,
    Any,
}

impl EntityFilter {
    pub fn matches(&self, kind: EntityKind) -> bool {
        match self {
            EntityFilter::Worm => kind == EntityKind::Worm,
            EntityFilter::Food => kind == EntityKind::Food,
            EntityFilter::Any => true,
        }
    }
}

/// Snapshot of the queryable state every live entity has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityState {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub kind: EntityKind,
}

/// Snapshot of the worm-only state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WormState {
    pub direction: f64,
    pub action_points: u64,
    pub max_action_points: u64,
    pub hit_points: u64,
    pub max_hit_points: u64,
    pub team: Option<TeamId>,
    /// Action-point cost of the currently selected weapon.
    pub weapon_cost: u64,
}

/// Read-only query surface over the game world.
///
/// `None` answers encode the weak-handle contract: the entity is dead or was
/// never issued ([`World::entity`]), or it exists but is not a worm
/// ([`World::worm`]).
pub trait World {
    /// Handles of every live entity, in world order.
    fn live_entities(&self) -> Vec<EntityId>;

    fn entity(&self, id: EntityId) -> Option<EntityState>;

    fn worm(&self, id: EntityId) -> Option<WormState>;
}

/// Mutation capability consumed by action statements.
///
/// A `false` return means the game refused or failed the action (blocked by
/// terrain, ballistics, ...). Affordability was already checked by the
/// scheduler, so callers treat `false` as informational and keep running.
pub trait ActionHandler {
    fn move_worm(&mut self, worm: EntityId) -> bool;

    fn turn(&mut self, worm: EntityId, angle: f64) -> bool;

    fn jump(&mut self, worm: EntityId) -> bool;

    fn fire(&mut self, worm: EntityId, propulsion_yield: f64) -> bool;

    fn toggle_weapon(&mut self, worm: EntityId) -> bool;

    fn print(&mut self, message: &str);
}
