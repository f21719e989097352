use std::fmt;

/// State of an enrollment session.
///
/// ```text
/// Idle -> Enrolling -> { Recording -> Processing } -> Completing -> Idle
///                ^__________________|       |                (success)
///                ^___________________________|
///   any state -> Idle (cancel)
/// ```
///
/// `Recording`/`Processing` repeat once per phrase. Cancellation is legal
/// from every state and always lands in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Enrolling,
    Recording,
    Processing,
    Completing,
}

impl SessionState {
    /// True if a new recording may start in this state.
    pub fn can_record(&self) -> bool {
        matches!(self, SessionState::Enrolling)
    }

    /// True if audio is being captured or a captured sample is still being
    /// scored. At most one recording is in flight at a time.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Enrolling => "enrolling",
            SessionState::Recording => "recording",
            SessionState::Processing => "processing",
            SessionState::Completing => "completing",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
