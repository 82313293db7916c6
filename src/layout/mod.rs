pub mod size;
pub mod stack;

pub use size::{Point, Size};
pub use stack::{stack_best_size, stack_children, Axis};
