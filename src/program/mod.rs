//! Worm programs and their resource-gated, resumable scheduler.
//!
//! A [`Program`] never recurses through its tree at run time. Composite
//! statements push their children onto the program's own pending-work stack;
//! suspending mid-run is therefore just returning with a non-empty stack,
//! and resuming is another [`Program::run`] call on a later turn.

use crate::environment::Globals;
use crate::expression::{EvalContext, Expression};
use crate::statement::Statement;
use crate::value::error::RuntimeError;
use crate::value::Value;
use crate::world::{ActionHandler, EntityId, World};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on statements executed by a single `run()` call.
pub const STATEMENT_BUDGET: usize = 1000;

/// What a `run()` call left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The pending-work stack drained; the next call starts a fresh pass.
    Finished,
    /// Blocked on action points or the statement budget; the next call
    /// resumes where this one stopped.
    Suspended,
    /// The program is permanently disabled.
    Errored,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    #[error("program already controls a worm")]
    AlreadyBound,
    #[error("bind target is not a live worm")]
    NotAWorm,
}

enum StepOutcome {
    Continue,
    /// An action statement was unaffordable; the turn is over.
    Blocked,
}

/// One worm's program: the shared syntax tree plus all per-worm run state.
#[derive(Debug)]
pub struct Program {
    root: Arc<Statement>,
    globals: Globals,
    pending: Vec<Arc<Statement>>,
    worm: Option<EntityId>,
    errored: bool,
    fault: Option<RuntimeError>,
}

impl Program {
    /// Build a program from an authored tree and its declared globals.
    ///
    /// Well-formedness is checked here, once; a malformed tree yields a
    /// program that is already errored and will never schedule anything.
    pub fn new(root: Statement, globals: Globals) -> Self {
        let root = Arc::new(root);
        let malformed = !root.is_well_formed();
        if malformed {
            warn!("rejecting malformed program: action statement inside a for-each body");
        }
        Self {
            root,
            globals,
            pending: Vec::new(),
            worm: None,
            errored: malformed,
            fault: malformed.then_some(RuntimeError::MalformedProgram),
        }
    }

    /// One-time attachment to the worm this program controls.
    pub fn bind<W: World>(&mut self, worm: EntityId, world: &W) -> Result<(), BindError> {
        if self.worm.is_some() {
            return Err(BindError::AlreadyBound);
        }
        if world.worm(worm).is_none() {
            return Err(BindError::NotAWorm);
        }
        self.worm = Some(worm);
        Ok(())
    }

    /// A new program over the same (immutable, shared) tree with fresh
    /// globals, an empty stack and no worm. A malformed original stays
    /// malformed.
    pub fn fork(&self) -> Program {
        let malformed = matches!(self.fault, Some(RuntimeError::MalformedProgram));
        Program {
            root: Arc::clone(&self.root),
            globals: self.globals.fresh_copy(),
            pending: Vec::new(),
            worm: None,
            errored: malformed,
            fault: malformed.then_some(RuntimeError::MalformedProgram),
        }
    }

    pub fn worm(&self) -> Option<EntityId> {
        self.worm
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// The fault that disabled this program, if any.
    pub fn fault(&self) -> Option<&RuntimeError> {
        self.fault.as_ref()
    }

    /// Whether a suspended continuation is waiting for the next turn.
    pub fn has_pending_work(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Read-only view of the program's globals (HUD, logs, tests).
    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Execute up to [`STATEMENT_BUDGET`] statements of this program for the
    /// current turn.
    ///
    /// An errored program never runs again; an unbound program is inert.
    /// An empty stack means a fresh pass: globals are reset to their
    /// defaults and the root is pushed. Popping an action statement whose
    /// cost exceeds the worm's action points ends the call; the statement is
    /// not re-pushed.
    pub fn run<C: World + ActionHandler>(&mut self, ctx: &mut C) -> RunState {
        if self.errored {
            return RunState::Errored;
        }
        let Some(actor) = self.worm else {
            return RunState::Finished;
        };

        if self.pending.is_empty() {
            debug!(worm = %actor, "starting fresh program pass");
            self.globals.reset_to_defaults();
            self.pending.push(Arc::clone(&self.root));
        }

        let mut executed = 0usize;
        while !self.pending.is_empty() {
            if executed == STATEMENT_BUDGET {
                debug!(executed, "statement budget exhausted, suspending");
                return RunState::Suspended;
            }
            let Some(statement) = self.pending.pop() else {
                break;
            };
            executed += 1;

            match self.step(ctx, actor, &statement) {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Blocked) => return RunState::Suspended,
                Err(fault) => {
                    warn!(code = fault.code(), %fault, worm = %actor, "program faulted");
                    self.errored = true;
                    self.fault = Some(fault);
                    return RunState::Errored;
                }
            }
        }
        RunState::Finished
    }

    fn step<C: World + ActionHandler>(
        &mut self,
        ctx: &mut C,
        actor: EntityId,
        statement: &Arc<Statement>,
    ) -> Result<StepOutcome, RuntimeError> {
        if statement.is_action() {
            return self.step_action(ctx, actor, statement);
        }

        match statement.as_ref() {
            Statement::Sequence(body) => {
                // Reversed so the leftmost child is popped first.
                for child in body.iter().rev() {
                    self.pending.push(Arc::clone(child));
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let condition = condition.evaluate(&eval)?.as_bool()?;
                if condition {
                    self.pending.push(Arc::clone(then_branch));
                } else if let Some(else_branch) = else_branch {
                    self.pending.push(Arc::clone(else_branch));
                }
            }
            Statement::While { condition, body } => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let condition = condition.evaluate(&eval)?.as_bool()?;
                if condition {
                    // The loop re-checks itself after its body; iteration is
                    // stack growth, not recursion.
                    self.pending.push(Arc::clone(statement));
                    self.pending.push(Arc::clone(body));
                }
            }
            Statement::ForEach {
                filter,
                binding,
                body,
            } => {
                let matching: Vec<EntityId> = ctx
                    .live_entities()
                    .into_iter()
                    .filter(|id| {
                        ctx.entity(*id)
                            .map_or(false, |entity| filter.matches(entity.kind))
                    })
                    .collect();
                // Unroll: one synthesized binding assignment plus one body
                // copy per entity, first entity on top of the stack.
                for id in matching.into_iter().rev() {
                    self.pending.push(Arc::clone(body));
                    self.pending.push(Arc::new(Statement::Assign {
                        name: binding.clone(),
                        value: Expression::Literal(Value::EntityRef(Some(id))),
                    }));
                }
            }
            Statement::Assign { name, value } => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let value = value.evaluate(&eval)?;
                self.globals.write(name, value)?;
            }
            Statement::Print(expr) => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let value = expr.evaluate(&eval)?;
                ctx.print(&value.to_string());
            }
            Statement::Move
            | Statement::Turn(_)
            | Statement::Jump
            | Statement::Fire(_)
            | Statement::ToggleWeapon => {
                // Handled by step_action above.
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn step_action<C: World + ActionHandler>(
        &mut self,
        ctx: &mut C,
        actor: EntityId,
        statement: &Arc<Statement>,
    ) -> Result<StepOutcome, RuntimeError> {
        let eval = EvalContext {
            globals: &self.globals,
            actor: Some(actor),
            world: &*ctx,
        };
        let Some(cost) = statement.cost(&eval)? else {
            return Ok(StepOutcome::Continue);
        };
        let available = ctx
            .worm(actor)
            .map(|worm| worm.action_points)
            .ok_or(RuntimeError::MissingWorldContext)?;
        if cost > available {
            debug!(cost, available, worm = %actor, "action unaffordable, ending turn");
            return Ok(StepOutcome::Blocked);
        }

        let performed = match statement.as_ref() {
            Statement::Move => ctx.move_worm(actor),
            Statement::Turn(angle) => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let angle = angle.evaluate(&eval)?.as_double()?;
                ctx.turn(actor, angle)
            }
            Statement::Jump => ctx.jump(actor),
            Statement::Fire(propulsion_yield) => {
                let eval = EvalContext {
                    globals: &self.globals,
                    actor: Some(actor),
                    world: &*ctx,
                };
                let propulsion_yield = propulsion_yield.evaluate(&eval)?.as_double()?;
                ctx.fire(actor, propulsion_yield)
            }
            Statement::ToggleWeapon => ctx.toggle_weapon(actor),
            _ => true,
        };
        if !performed {
            warn!(worm = %actor, "action handler refused action");
        }
        Ok(StepOutcome::Continue)
    }
}
