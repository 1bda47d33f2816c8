pub mod executor;
pub mod types;

pub use executor::{apply, run_bounded};
pub use types::{Mutation, MutationResult, Operation};
