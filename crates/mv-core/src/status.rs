//! Per-call execution status shared by all movement actions.

/// Outcome signal of the most recent movement action an agent executed.
///
/// Distinct from the returned traveled path: an action can succeed without
/// moving (e.g. `goto_inside` with `target == location`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// No action has run yet for this agent.
    #[default]
    Idle,
    Success,
    Failure,
}

impl Status {
    /// Human-readable label, useful for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle    => "idle",
            Status::Success => "success",
            Status::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
