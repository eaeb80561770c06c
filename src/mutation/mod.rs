//! Mutation coordination: phases, notices and settle-time cache invalidation.

mod coordinator;
mod notify;
mod phase;

pub use coordinator::{CANCELLED_MESSAGE, MutationCoordinator, SettlePolicy};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use phase::{
    MutationKind, MutationOutcome, MutationPhase, MutationResult, MutationState, PendingMutation,
};
