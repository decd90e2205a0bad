pub mod operator;
pub mod search;

use crate::environment::Globals;
use crate::value::error::RuntimeError;
use crate::value::Value;
use crate::world::{EntityId, EntityKind, EntityState, World, WormState};
use compact_str::CompactString;
use operator::{
    BinaryOperator, EntityPredicate, EntityProperty, ShortCircuitOperator, UnaryOperator,
};

/// Everything an expression may look at: the program's globals, its bound
/// worm (if any), and the world's query surface. Expressions never mutate
/// any of it.
pub struct EvalContext<'a, W: World> {
    pub globals: &'a Globals,
    pub actor: Option<EntityId>,
    pub world: &'a W,
}

impl<'a, W: World> EvalContext<'a, W> {
    fn actor(&self) -> Result<EntityId, RuntimeError> {
        self.actor.ok_or(RuntimeError::UnboundSelf)
    }
}

/// A side-effect-free expression tree node.
#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Value),
    Variable(CompactString),
    /// The worm the program controls. Faults when no worm is bound.
    SelfRef,
    /// The empty entity reference.
    Null,
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    ShortCircuit {
        operator: ShortCircuitOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Property {
        property: EntityProperty,
        entity: Box<Expression>,
    },
    Predicate {
        predicate: EntityPredicate,
        entity: Box<Expression>,
    },
    /// Whether the operand worm is on the acting worm's team.
    SameTeam(Box<Expression>),
    /// Nearest entity along the ray at `direction + offset`.
    SearchNearest(Box<Expression>),
}

impl Expression {
    pub fn evaluate<W: World>(&self, ctx: &EvalContext<'_, W>) -> Result<Value, RuntimeError> {
        match self {
            Expression::Literal(value) => Ok(*value),
            Expression::Variable(name) => ctx.globals.read(name),
            Expression::SelfRef => Ok(Value::EntityRef(Some(ctx.actor()?))),
            Expression::Null => Ok(Value::EntityRef(None)),
            Expression::Unary { operator, operand } => {
                let operand = operand.evaluate(ctx)?;
                match operator {
                    UnaryOperator::Not => operand.logical_not(),
                    UnaryOperator::Sqrt => operand.sqrt(),
                    UnaryOperator::Sin => operand.sin(),
                    UnaryOperator::Cos => operand.cos(),
                }
            }
            Expression::Binary { operator, lhs, rhs } => {
                let lhs = lhs.evaluate(ctx)?;
                let rhs = rhs.evaluate(ctx)?;
                self.evaluate_binary(*operator, &lhs, &rhs)
            }
            Expression::ShortCircuit { operator, lhs, rhs } => {
                let lhs = lhs.evaluate(ctx)?.as_bool()?;
                match operator {
                    ShortCircuitOperator::And if !lhs => Ok(Value::Bool(false)),
                    ShortCircuitOperator::Or if lhs => Ok(Value::Bool(true)),
                    _ => Ok(Value::Bool(rhs.evaluate(ctx)?.as_bool()?)),
                }
            }
            Expression::Property { property, entity } => {
                let reference = entity.evaluate(ctx)?.as_entity_ref()?;
                self.evaluate_property(ctx, *property, reference)
            }
            Expression::Predicate { predicate, entity } => {
                let reference = entity.evaluate(ctx)?.as_entity_ref()?;
                // Predicates are total: the empty reference and dead
                // entities are neither worm nor food.
                let kind = reference.and_then(|id| ctx.world.entity(id)).map(|e| e.kind);
                let result = match predicate {
                    EntityPredicate::IsWorm => kind == Some(EntityKind::Worm),
                    EntityPredicate::IsFood => kind == Some(EntityKind::Food),
                };
                Ok(Value::Bool(result))
            }
            Expression::SameTeam(entity) => {
                let own = self.worm_state(ctx, ctx.actor()?, "sameTeam")?;
                let reference = entity.evaluate(ctx)?.as_entity_ref()?;
                let other = reference
                    .ok_or(RuntimeError::WrongEntityCapability("sameTeam"))
                    .and_then(|id| self.worm_state(ctx, id, "sameTeam"))?;
                let same = match (own.team, other.team) {
                    (Some(a), Some(b)) => a == b,
                    // Teamless worms belong to no team, not to a shared one.
                    _ => false,
                };
                Ok(Value::Bool(same))
            }
            Expression::SearchNearest(offset) => {
                let offset = offset.evaluate(ctx)?.as_double()?;
                let found = search::nearest_entity(ctx.world, ctx.actor()?, offset)?;
                Ok(Value::EntityRef(found))
            }
        }
    }

    fn evaluate_binary(
        &self,
        operator: BinaryOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, RuntimeError> {
        match operator {
            BinaryOperator::Add => lhs.add(rhs),
            BinaryOperator::Subtract => lhs.subtract(rhs),
            BinaryOperator::Multiply => lhs.multiply(rhs),
            BinaryOperator::Divide => lhs.divide(rhs),
            BinaryOperator::LessThan => lhs.less_than(rhs),
            BinaryOperator::LessThanEqual => lhs.less_than_or_equal(rhs),
            BinaryOperator::GreaterThan => lhs.greater_than(rhs),
            BinaryOperator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            BinaryOperator::EqualEqual => Ok(Value::Bool(lhs.is_equal(rhs))),
            BinaryOperator::BangEqual => Ok(Value::Bool(!lhs.is_equal(rhs))),
        }
    }

    fn evaluate_property<W: World>(
        &self,
        ctx: &EvalContext<'_, W>,
        property: EntityProperty,
        reference: Option<EntityId>,
    ) -> Result<Value, RuntimeError> {
        let what = property.name();
        let id = reference.ok_or(RuntimeError::WrongEntityCapability(what))?;
        let entity = self.entity_state(ctx, id, what)?;
        let result = match property {
            EntityProperty::X => entity.x,
            EntityProperty::Y => entity.y,
            EntityProperty::Radius => entity.radius,
            EntityProperty::Direction => self.worm_state(ctx, id, what)?.direction,
            EntityProperty::ActionPoints => self.worm_state(ctx, id, what)?.action_points as f64,
            EntityProperty::MaxActionPoints => {
                self.worm_state(ctx, id, what)?.max_action_points as f64
            }
            EntityProperty::HitPoints => self.worm_state(ctx, id, what)?.hit_points as f64,
            EntityProperty::MaxHitPoints => self.worm_state(ctx, id, what)?.max_hit_points as f64,
        };
        Ok(Value::Double(result))
    }

    fn entity_state<W: World>(
        &self,
        ctx: &EvalContext<'_, W>,
        id: EntityId,
        what: &'static str,
    ) -> Result<EntityState, RuntimeError> {
        ctx.world
            .entity(id)
            .ok_or(RuntimeError::WrongEntityCapability(what))
    }

    fn worm_state<W: World>(
        &self,
        ctx: &EvalContext<'_, W>,
        id: EntityId,
        what: &'static str,
    ) -> Result<WormState, RuntimeError> {
        ctx.world
            .worm(id)
            .ok_or(RuntimeError::WrongEntityCapability(what))
    }
}

// Construction helpers for the authoring layer.
impl Expression {
    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    pub fn double(value: f64) -> Self {
        Expression::Literal(Value::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Value::Bool(value))
    }

    pub fn variable(name: impl Into<CompactString>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn binary(operator: BinaryOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn short_circuit(operator: ShortCircuitOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::ShortCircuit {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn property(property: EntityProperty, entity: Expression) -> Self {
        Expression::Property {
            property,
            entity: Box::new(entity),
        }
    }

    pub fn predicate(predicate: EntityPredicate, entity: Expression) -> Self {
        Expression::Predicate {
            predicate,
            entity: Box::new(entity),
        }
    }

    pub fn same_team(entity: Expression) -> Self {
        Expression::SameTeam(Box::new(entity))
    }

    pub fn search_nearest(angle_offset: Expression) -> Self {
        Expression::SearchNearest(Box::new(angle_offset))
    }
}
