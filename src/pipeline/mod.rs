pub mod types;
pub mod classifier;
pub mod sentiment;
pub mod decision;

pub use types::*;
