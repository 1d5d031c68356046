pub mod flush;
pub mod id;
pub mod loader;
pub mod model;
pub mod sampler;
pub mod testutil;
pub mod tree;

pub use id::IdGenerator;
pub use model::{DemographicTables, Gender, Person, decade_of};
pub use sampler::{PersonSampler, weighted_choice};
pub use tree::FamilyTree;
