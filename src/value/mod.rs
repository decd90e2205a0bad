pub mod error;

use crate::world::EntityId;
use error::RuntimeError;
use std::hash::{Hash, Hasher};

/// Tag of a [`Value`]. Fixed per variable at first declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Double,
    EntityRef,
}

impl ValueKind {
    /// The value a variable of this kind is reset to at the start of a
    /// fresh run.
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::EntityRef => Value::EntityRef(None),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Double => write!(f, "double"),
            ValueKind::EntityRef => write!(f, "entity"),
        }
    }
}

/// A value of the worm-program language: one of the three kinds, immutable.
///
/// An `EntityRef` holds a weak handle into the world, or nothing (`null`).
/// Doubles compare and hash by bit pattern so the two stay consistent.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Bool(bool),
    Double(f64),
    EntityRef(Option<EntityId>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Double(_) => ValueKind::Double,
            Value::EntityRef(_) => ValueKind::EntityRef,
        }
    }

    pub fn as_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Value::Bool(v) => Ok(*v),
            v => Err(RuntimeError::TypeMismatch {
                expected: ValueKind::Bool,
                actual: v.kind(),
            }),
        }
    }

    pub fn as_double(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Double(v) => Ok(*v),
            v => Err(RuntimeError::TypeMismatch {
                expected: ValueKind::Double,
                actual: v.kind(),
            }),
        }
    }

    pub fn as_entity_ref(&self) -> Result<Option<EntityId>, RuntimeError> {
        match self {
            Value::EntityRef(v) => Ok(*v),
            v => Err(RuntimeError::TypeMismatch {
                expected: ValueKind::EntityRef,
                actual: v.kind(),
            }),
        }
    }
}

// Arithmetic
impl Value {
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Double(self.as_double()? + other.as_double()?))
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Double(self.as_double()? - other.as_double()?))
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Double(self.as_double()? * other.as_double()?))
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeError> {
        let lhs = self.as_double()?;
        let rhs = other.as_double()?;
        if rhs == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Double(lhs / rhs))
    }

    pub fn sqrt(&self) -> Result<Value, RuntimeError> {
        let v = self.as_double()?;
        if v < 0.0 {
            return Err(RuntimeError::NegativeSqrtArgument(v));
        }
        Ok(Value::Double(v.sqrt()))
    }

    pub fn sin(&self) -> Result<Value, RuntimeError> {
        Ok(Value::Double(self.as_double()?.sin()))
    }

    pub fn cos(&self) -> Result<Value, RuntimeError> {
        Ok(Value::Double(self.as_double()?.cos()))
    }
}

// Comparison
impl Value {
    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(self.as_double()? < other.as_double()?))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(self.as_double()? <= other.as_double()?))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(self.as_double()? > other.as_double()?))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(self.as_double()? >= other.as_double()?))
    }

    pub fn logical_not(&self) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(!self.as_bool()?))
    }

    /// Tag + payload equality, total over all kinds. Values of different
    /// kinds are never equal.
    pub fn is_equal(&self, other: &Value) -> bool {
        self == other
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Double(lhs), Value::Double(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Value::EntityRef(lhs), Value::EntityRef(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::EntityRef(v) => v.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::EntityRef(Some(id)) => write!(f, "{id}"),
            Value::EntityRef(None) => write!(f, "null"),
        }
    }
}
