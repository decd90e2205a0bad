pub mod environment;
pub mod expression;
pub mod program;
pub mod statement;
pub mod value;
pub mod world;
