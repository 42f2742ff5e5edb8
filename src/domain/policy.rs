//! Session policy knobs.
//!
//! The observed behavior of the system leaves two choices open: whether vote
//! values are broadcast on every cast, and whether more than one member may
//! hold the facilitator flag. Both are kept configurable instead of being
//! fixed one way.

/// Runtime policy for all rooms served by one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Broadcast raw vote values on every cast. When off (the default),
    /// clients only learn who has voted until a reveal is requested.
    pub open_ballots: bool,

    /// Restrict the facilitator flag to a single holder per room. When off
    /// (the default), anyone claiming the facilitator role on join gets the
    /// flag, allowing co-facilitation.
    pub exclusive_facilitator: bool,
}
