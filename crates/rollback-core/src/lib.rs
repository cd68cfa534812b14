pub mod error;
pub mod revision;
pub mod rollback;
pub mod select;

pub use error::{ErrorKind, RollbackError, Stage};
pub use revision::{Condition, RevisionRecord};
pub use rollback::{roll_back, CloudRun, Outcome, RollbackTarget};
pub use select::{is_retired, select_retired};
