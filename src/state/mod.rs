//! In-memory release state used as rollback input.
//!
//! Nothing here is persisted: a process killed mid-release leaves its
//! completed side effects in place.

mod release_state;

pub use release_state::{GitReleaseState, ReleaseStateTracker};
