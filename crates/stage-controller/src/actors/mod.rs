//! Stage actor.
//!
//! All mutable stage state (roster, focus, viewport, mode) is owned by a
//! single [`StageActor`] task and mutated only from its mailbox loop;
//! external consumers interact through a [`StageActorHandle`] and receive
//! read-only snapshots. This single-writer discipline substitutes for
//! locking: there is genuinely only one writer.

pub mod messages;
pub mod stage;

pub use messages::{StageMessage, StageSnapshot};
pub use stage::{StageActor, StageActorHandle};
