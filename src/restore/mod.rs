pub mod coordinates;
pub mod eligibility;
pub(crate) mod logic;
pub mod mode;
pub mod peer;

pub use logic::{run_restore_flow, RestoreOutcome, RestoreSettings};
