pub mod models;
pub mod validator;

pub use models::{ImportReport, RosterRow};
pub use validator::{RosterValidator, ValidationReport};
