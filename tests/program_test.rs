mod common;

use color_eyre::eyre::Result;
use common::TestWorld;
use wormscript::environment::Globals;
use wormscript::expression::Expression;
use wormscript::program::{BindError, Program, RunState};
use wormscript::statement::Statement;
use wormscript::value::error::RuntimeError;
use wormscript::value::Value;
use wormscript::world::EntityFilter;

fn malformed_root() -> Statement {
    Statement::for_each(EntityFilter::Any, "e", Statement::Move)
}

#[test]
fn malformed_tree_is_rejected_at_construction() -> Result<()> {
    let mut world = TestWorld::new();
    let worm = world.add_worm(0.0, 0.0, 0.0, 100);
    let mut globals = Globals::new();
    globals.declare("e", Value::EntityRef(None))?;
    let mut program = Program::new(malformed_root(), globals);

    // Errored before any turn was ever attempted.
    assert!(program.is_errored());
    assert_eq!(program.fault(), Some(&RuntimeError::MalformedProgram));

    program.bind(worm, &world)?;
    assert_eq!(program.run(&mut world), RunState::Errored);
    assert!(world.actions.is_empty());
    assert!(world.printed.is_empty());
    Ok(())
}

#[test]
fn unbound_program_is_inert() {
    let mut world = TestWorld::new();
    let mut program = Program::new(Statement::Print(Expression::double(1.0)), Globals::new());
    assert_eq!(program.run(&mut world), RunState::Finished);
    assert!(world.printed.is_empty());
    assert!(!program.has_pending_work());
}

#[test]
fn binding_twice_is_an_error() -> Result<()> {
    let mut world = TestWorld::new();
    let first = world.add_worm(0.0, 0.0, 0.0, 10);
    let second = world.add_worm(1.0, 0.0, 0.0, 10);
    let mut program = Program::new(Statement::Move, Globals::new());
    program.bind(first, &world)?;
    assert_eq!(program.bind(second, &world), Err(BindError::AlreadyBound));
    assert_eq!(program.worm(), Some(first));
    Ok(())
}

#[test]
fn binding_rejects_non_worms() {
    let mut world = TestWorld::new();
    let food = world.add_food(0.0, 0.0, 0.2);
    let dead = world.add_worm(1.0, 0.0, 0.0, 10);
    world.kill(dead);
    let mut program = Program::new(Statement::Move, Globals::new());
    assert_eq!(program.bind(food, &world), Err(BindError::NotAWorm));
    assert_eq!(program.bind(dead, &world), Err(BindError::NotAWorm));
    assert_eq!(program.worm(), None);
}

#[test]
fn fork_shares_the_tree_but_not_the_run_state() -> Result<()> {
    let mut world = TestWorld::new();
    let mut globals = Globals::new();
    globals.declare("a", Value::Double(0.0))?;
    let root = Statement::assign(
        "a",
        Expression::binary(
            wormscript::expression::operator::BinaryOperator::Divide,
            Expression::double(1.0),
            Expression::double(0.0),
        ),
    );
    let worm = world.add_worm(0.0, 0.0, 0.0, 10);
    let mut original = Program::new(root, globals);
    original.bind(worm, &world)?;
    assert_eq!(original.run(&mut world), RunState::Errored);

    // The fork starts clean: unbound, empty stack, not errored.
    let mut fork = original.fork();
    assert!(!fork.is_errored());
    assert_eq!(fork.worm(), None);
    assert!(!fork.has_pending_work());

    // And it can be driven independently (to the same fault, here).
    let second = world.add_worm(2.0, 0.0, 0.0, 10);
    fork.bind(second, &world)?;
    assert_eq!(fork.run(&mut world), RunState::Errored);
    assert!(original.is_errored());
    Ok(())
}

#[test]
fn fork_of_a_malformed_program_stays_malformed() -> Result<()> {
    let mut globals = Globals::new();
    globals.declare("e", Value::EntityRef(None))?;
    let original = Program::new(malformed_root(), globals);
    let fork = original.fork();
    assert!(fork.is_errored());
    assert_eq!(fork.fault(), Some(&RuntimeError::MalformedProgram));
    Ok(())
}

#[test]
fn dead_worm_mid_run_faults_instead_of_crashing() -> Result<()> {
    let mut world = TestWorld::new();
    let worm = world.add_worm(0.0, 0.0, 0.0, 100);
    let mut program = Program::new(Statement::Move, Globals::new());
    program.bind(worm, &world)?;
    world.kill(worm);
    assert_eq!(program.run(&mut world), RunState::Errored);
    assert!(program.is_errored());
    Ok(())
}
