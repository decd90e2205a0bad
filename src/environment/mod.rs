//! The global variable store of a worm program.
//!
//! The language has a single flat scope. Each variable's kind is fixed by its
//! first declaration; assigning a value of another kind is a programming
//! error, never a coercion.

use crate::value::error::RuntimeError;
use crate::value::{Value, ValueKind};
use compact_str::CompactString;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Globals {
    bindings: HashMap<CompactString, Binding>,
}

#[derive(Debug, Clone)]
struct Binding {
    kind: ValueKind,
    value: Value,
    initial: Value,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable with its initial value, fixing its kind.
    ///
    /// Construction-time only; redeclaring an existing name with a value of
    /// another kind fails with `TypeMismatch`.
    pub fn declare(
        &mut self,
        name: impl Into<CompactString>,
        initial: Value,
    ) -> Result<(), RuntimeError> {
        let name = name.into();
        if let Some(binding) = self.bindings.get(&name) {
            if binding.kind != initial.kind() {
                return Err(RuntimeError::TypeMismatch {
                    expected: binding.kind,
                    actual: initial.kind(),
                });
            }
        }
        self.bindings.insert(
            name,
            Binding {
                kind: initial.kind(),
                value: initial,
                initial,
            },
        );
        Ok(())
    }

    pub fn read(&self, name: &str) -> Result<Value, RuntimeError> {
        self.bindings
            .get(name)
            .map(|binding| binding.value)
            .ok_or_else(|| RuntimeError::UnboundVariable(name.into()))
    }

    pub fn write(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let binding = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| RuntimeError::UnboundVariable(name.into()))?;
        if binding.kind != value.kind() {
            return Err(RuntimeError::TypeMismatch {
                expected: binding.kind,
                actual: value.kind(),
            });
        }
        binding.value = value;
        Ok(())
    }

    /// Overwrite every binding with its kind's default. Called once at the
    /// start of a fresh run.
    pub fn reset_to_defaults(&mut self) {
        for binding in self.bindings.values_mut() {
            binding.value = binding.kind.default_value();
        }
    }

    /// A fresh store with the same declarations at their initial values.
    /// Used when one authored script is instantiated for several worms.
    pub fn fresh_copy(&self) -> Self {
        let bindings = self
            .bindings
            .iter()
            .map(|(name, binding)| {
                (
                    name.clone(),
                    Binding {
                        kind: binding.kind,
                        value: binding.initial,
                        initial: binding.initial,
                    },
                )
            })
            .collect();
        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityId;

    #[test]
    fn read_of_undeclared_name_faults() {
        let globals = Globals::new();
        assert!(matches!(
            globals.read("a"),
            Err(RuntimeError::UnboundVariable(_))
        ));
    }

    #[test]
    fn write_of_undeclared_name_faults() {
        let mut globals = Globals::new();
        assert!(matches!(
            globals.write("a", Value::Double(1.0)),
            Err(RuntimeError::UnboundVariable(_))
        ));
    }

    #[test]
    fn kind_is_fixed_at_declaration() {
        let mut globals = Globals::new();
        globals.declare("a", Value::Double(1.0)).unwrap();
        globals.write("a", Value::Double(2.0)).unwrap();
        let err = globals.write("a", Value::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeMismatch {
                expected: ValueKind::Double,
                actual: ValueKind::Bool,
            }
        );
        // The failed write left the old value in place.
        assert_eq!(globals.read("a").unwrap(), Value::Double(2.0));
    }

    #[test]
    fn reset_yields_kind_defaults() {
        let mut globals = Globals::new();
        globals.declare("b", Value::Bool(true)).unwrap();
        globals.declare("d", Value::Double(4.5)).unwrap();
        globals
            .declare("e", Value::EntityRef(Some(EntityId(7))))
            .unwrap();
        globals.reset_to_defaults();
        assert_eq!(globals.read("b").unwrap(), Value::Bool(false));
        assert_eq!(globals.read("d").unwrap(), Value::Double(0.0));
        assert_eq!(globals.read("e").unwrap(), Value::EntityRef(None));
    }

    #[test]
    fn fresh_copy_restores_initial_values() {
        let mut globals = Globals::new();
        globals.declare("d", Value::Double(4.5)).unwrap();
        globals.write("d", Value::Double(-1.0)).unwrap();
        let copy = globals.fresh_copy();
        assert_eq!(copy.read("d").unwrap(), Value::Double(4.5));
        assert_eq!(globals.read("d").unwrap(), Value::Double(-1.0));
    }
}
