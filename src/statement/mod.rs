//! The statement tree of a worm program.
//!
//! Composite children are held behind `Arc` so one authored tree can be
//! shared by every program instantiated from it, and so the scheduler can
//! push cheap handles onto its pending-work stack instead of recursing.

use crate::expression::{EvalContext, Expression};
use crate::value::error::RuntimeError;
use crate::world::{EntityFilter, World, WormState};
use compact_str::CompactString;
use std::f64::consts::PI;
use std::sync::Arc;

#[derive(Debug)]
pub enum Statement {
    Sequence(Vec<Arc<Statement>>),
    If {
        condition: Expression,
        then_branch: Arc<Statement>,
        else_branch: Option<Arc<Statement>>,
    },
    While {
        condition: Expression,
        body: Arc<Statement>,
    },
    /// Unrolled at schedule time: the body runs once per matching live
    /// entity, with `binding` assigned the entity's reference first.
    ForEach {
        filter: EntityFilter,
        binding: CompactString,
        body: Arc<Statement>,
    },
    Assign {
        name: CompactString,
        value: Expression,
    },
    Print(Expression),
    // Action statements. Each carries an action-point cost computed from
    // live game state; the scheduler gates execution on affordability.
    Move,
    Turn(Expression),
    Jump,
    Fire(Expression),
    ToggleWeapon,
}

impl Statement {
    /// Whether this statement requests a costed game action.
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Statement::Move
                | Statement::Turn(_)
                | Statement::Jump
                | Statement::Fire(_)
                | Statement::ToggleWeapon
        )
    }

    /// Direct child statements.
    pub fn children(&self) -> Vec<&Arc<Statement>> {
        match self {
            Statement::Sequence(body) => body.iter().collect(),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => match else_branch {
                Some(else_branch) => vec![then_branch, else_branch],
                None => vec![then_branch],
            },
            Statement::While { body, .. } => vec![body],
            Statement::ForEach { body, .. } => vec![body],
            Statement::Assign { .. }
            | Statement::Print(_)
            | Statement::Move
            | Statement::Turn(_)
            | Statement::Jump
            | Statement::Fire(_)
            | Statement::ToggleWeapon => Vec::new(),
        }
    }

    /// Whether an action statement occurs anywhere in this subtree.
    pub fn contains_action(&self) -> bool {
        self.is_action() || self.children().iter().any(|child| child.contains_action())
    }

    /// Static well-formedness: no `ForEach` body may contain an action
    /// statement at any depth. A for-each body is unrolled once per matching
    /// entity when scheduled, so an action inside it could request an
    /// unbounded number of costed actions in a single scheduling step.
    pub fn is_well_formed(&self) -> bool {
        let local = match self {
            Statement::ForEach { body, .. } => !body.contains_action(),
            _ => true,
        };
        local && self.children().iter().all(|child| child.is_well_formed())
    }

    /// Action-point cost of an action statement, computed from live game
    /// state. `None` for non-action statements.
    pub fn cost<W: World>(
        &self,
        ctx: &EvalContext<'_, W>,
    ) -> Result<Option<u64>, RuntimeError> {
        let cost = match self {
            Statement::Move => {
                let worm = self.acting_worm(ctx, "move")?;
                let d = worm.direction;
                (d.cos().abs() + 4.0 * d.sin().abs()).ceil() as u64
            }
            Statement::Turn(angle) => {
                let angle = angle.evaluate(ctx)?.as_double()?;
                (60.0 * angle.abs() / (2.0 * PI)).ceil() as u64
            }
            Statement::Jump => {
                // Exactly affordable when the worm has points left, never
                // affordable when it has none.
                let worm = self.acting_worm(ctx, "jump")?;
                if worm.action_points == 0 {
                    1
                } else {
                    worm.action_points
                }
            }
            Statement::Fire(_) => self.acting_worm(ctx, "fire")?.weapon_cost,
            Statement::ToggleWeapon => 0,
            _ => return Ok(None),
        };
        Ok(Some(cost))
    }

    fn acting_worm<W: World>(
        &self,
        ctx: &EvalContext<'_, W>,
        what: &'static str,
    ) -> Result<WormState, RuntimeError> {
        let actor = ctx.actor.ok_or(RuntimeError::MissingWorldContext)?;
        ctx.world
            .worm(actor)
            .ok_or(RuntimeError::WrongEntityCapability(what))
    }
}

// Construction helpers for the authoring layer.
impl Statement {
    pub fn sequence(body: impl IntoIterator<Item = Statement>) -> Self {
        Statement::Sequence(body.into_iter().map(Arc::new).collect())
    }

    pub fn if_else(
        condition: Expression,
        then_branch: Statement,
        else_branch: Option<Statement>,
    ) -> Self {
        Statement::If {
            condition,
            then_branch: Arc::new(then_branch),
            else_branch: else_branch.map(Arc::new),
        }
    }

    pub fn while_loop(condition: Expression, body: Statement) -> Self {
        Statement::While {
            condition,
            body: Arc::new(body),
        }
    }

    pub fn for_each(
        filter: EntityFilter,
        binding: impl Into<CompactString>,
        body: Statement,
    ) -> Self {
        Statement::ForEach {
            filter,
            binding: binding.into(),
            body: Arc::new(body),
        }
    }

    pub fn assign(name: impl Into<CompactString>, value: Expression) -> Self {
        Statement::Assign {
            name: name.into(),
            value,
        }
    }
}
