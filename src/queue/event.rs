#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    Enqueue,
    DrainSucceeded,
    /// The host still has no active kit.
    DrainDeferred,
    /// The write failed or the stored job could not be read.
    DrainFailed,
}

/// Points at which a pending job is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainTrigger {
    ApplicationReady,
    HostReady,
}

impl DrainTrigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationReady => "application_ready",
            Self::HostReady => "host_ready",
        }
    }
}
