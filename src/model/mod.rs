pub mod person;
pub mod tables;

pub use person::{Gender, Person};
pub use tables::{DemographicTables, decade_of};
