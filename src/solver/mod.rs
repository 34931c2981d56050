pub mod generate;
pub mod kernels;
pub mod mem;
pub mod pipeline;
pub mod reference;
pub mod types;

pub use pipeline::Solver;
