pub mod coordinator;
pub mod ledger;

pub use coordinator::{MatchCoordinator, SessionPhase, SessionSnapshot};
pub use ledger::MatchLedger;
