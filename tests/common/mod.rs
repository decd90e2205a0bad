//! Scripted in-memory world used by the integration tests.
//!
//! Implements both engine seams over a vector of entities and records every
//! handler call so tests can assert on execution order.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use wormscript::expression::search::normalize_angle;
use wormscript::world::{
    ActionHandler, EntityId, EntityKind, EntityState, TeamId, World, WormState,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(EntityId),
    Turn(EntityId, f64),
    Jump(EntityId),
    Fire(EntityId, f64),
    ToggleWeapon(EntityId),
}

#[derive(Debug, Clone)]
struct TestEntity {
    state: EntityState,
    worm: Option<WormState>,
    alive: bool,
}

#[derive(Debug, Default)]
pub struct TestWorld {
    entities: Vec<TestEntity>,
    pub actions: Vec<Action>,
    pub printed: Vec<String>,
    /// When set, boolean-returning handler calls report failure (the call is
    /// still recorded and still charged).
    pub refuse_actions: bool,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_worm(&mut self, x: f64, y: f64, direction: f64, action_points: u64) -> EntityId {
        self.add_worm_full(x, y, direction, action_points, None, 10)
    }

    pub fn add_worm_full(
        &mut self,
        x: f64,
        y: f64,
        direction: f64,
        action_points: u64,
        team: Option<TeamId>,
        weapon_cost: u64,
    ) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(TestEntity {
            state: EntityState {
                x,
                y,
                radius: 0.25,
                kind: EntityKind::Worm,
            },
            worm: Some(WormState {
                direction,
                action_points,
                max_action_points: action_points.max(100),
                hit_points: 50,
                max_hit_points: 100,
                team,
                weapon_cost,
            }),
            alive: true,
        });
        id
    }

    pub fn add_food(&mut self, x: f64, y: f64, radius: f64) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(TestEntity {
            state: EntityState {
                x,
                y,
                radius,
                kind: EntityKind::Food,
            },
            worm: None,
            alive: true,
        });
        id
    }

    pub fn kill(&mut self, id: EntityId) {
        self.entities[id.0 as usize].alive = false;
    }

    pub fn set_action_points(&mut self, id: EntityId, action_points: u64) {
        if let Some(worm) = &mut self.entities[id.0 as usize].worm {
            worm.action_points = action_points;
        }
    }

    pub fn action_points(&self, id: EntityId) -> u64 {
        self.entities[id.0 as usize]
            .worm
            .as_ref()
            .map(|worm| worm.action_points)
            .unwrap_or(0)
    }

    pub fn direction(&self, id: EntityId) -> f64 {
        self.entities[id.0 as usize]
            .worm
            .as_ref()
            .map(|worm| worm.direction)
            .unwrap_or(0.0)
    }

    fn charge(&mut self, id: EntityId, cost: u64) {
        if let Some(worm) = &mut self.entities[id.0 as usize].worm {
            worm.action_points = worm.action_points.saturating_sub(cost);
        }
    }
}

impl World for TestWorld {
    fn live_entities(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| entity.alive)
            .map(|(index, _)| EntityId(index as u32))
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<EntityState> {
        self.entities
            .get(id.0 as usize)
            .filter(|entity| entity.alive)
            .map(|entity| entity.state)
    }

    fn worm(&self, id: EntityId) -> Option<WormState> {
        self.entities
            .get(id.0 as usize)
            .filter(|entity| entity.alive)
            .and_then(|entity| entity.worm)
    }
}

impl ActionHandler for TestWorld {
    fn move_worm(&mut self, worm: EntityId) -> bool {
        self.actions.push(Action::Move(worm));
        if self.refuse_actions {
            return false;
        }
        let Some(state) = self.worm(worm) else {
            return false;
        };
        let cost = (state.direction.cos().abs() + 4.0 * state.direction.sin().abs()).ceil() as u64;
        let entity = &mut self.entities[worm.0 as usize];
        entity.state.x += state.direction.cos() * entity.state.radius;
        entity.state.y += state.direction.sin() * entity.state.radius;
        self.charge(worm, cost);
        true
    }

    fn turn(&mut self, worm: EntityId, angle: f64) -> bool {
        self.actions.push(Action::Turn(worm, angle));
        if self.refuse_actions {
            return false;
        }
        let cost = (60.0 * angle.abs() / std::f64::consts::TAU).ceil() as u64;
        if let Some(state) = &mut self.entities[worm.0 as usize].worm {
            state.direction = normalize_angle(state.direction + angle);
        }
        self.charge(worm, cost);
        true
    }

    fn jump(&mut self, worm: EntityId) -> bool {
        self.actions.push(Action::Jump(worm));
        if self.refuse_actions {
            return false;
        }
        // Jumping spends the whole balance.
        if let Some(state) = &mut self.entities[worm.0 as usize].worm {
            state.action_points = 0;
        }
        true
    }

    fn fire(&mut self, worm: EntityId, propulsion_yield: f64) -> bool {
        self.actions.push(Action::Fire(worm, propulsion_yield));
        if self.refuse_actions {
            return false;
        }
        let cost = self.worm(worm).map(|state| state.weapon_cost).unwrap_or(0);
        self.charge(worm, cost);
        true
    }

    fn toggle_weapon(&mut self, worm: EntityId) -> bool {
        self.actions.push(Action::ToggleWeapon(worm));
        !self.refuse_actions
    }

    fn print(&mut self, message: &str) {
        self.printed.push(message.to_string());
    }
}
