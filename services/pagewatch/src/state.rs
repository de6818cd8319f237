//! Observed page state and per-check results

use std::fmt;

use crate::detector::Fingerprint;

/// The comparison baseline carried from one check to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedState {
    /// Digest of the last observed page body
    Fingerprint(Fingerprint),
    /// Whether the search text was present at the last check
    Presence(bool),
}

impl fmt::Display for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedState::Fingerprint(fp) => write!(f, "fingerprint {}", fp),
            ObservedState::Presence(true) => write!(f, "search text present"),
            ObservedState::Presence(false) => write!(f, "search text absent"),
        }
    }
}

/// Outcome of one fetch and compare cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub content_len: usize,
    pub observed: ObservedState,
    pub changed: bool,
}
