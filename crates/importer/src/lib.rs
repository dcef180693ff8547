pub mod error;
pub mod roster;
pub mod sources;
pub mod traits;

pub use error::{ImporterError, Result};
pub use roster::ImportReport;
pub use sources::tabular::CsvRosterImporter;
pub use traits::{ImportContext, RosterImporter};
