pub mod instance;
pub mod runtime;
pub mod solver;

pub use instance::{Item, Problem};
pub use solver::pipeline::Solver;
pub use solver::types::Solution;
