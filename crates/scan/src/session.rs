use tracing::debug;

use crate::stabilizer::ScanStabilizer;

/// One scanning session as the client drives it.
///
/// A session starts inactive; `start` arms it and raw reads are then fed
/// through the stabilizer. The moment a read confirms a code the session
/// deactivates itself and hands the code back for submission.
///
/// Deactivation happens *before* the submission's outcome is known — the
/// reference client stops its scanner the instant it fires the request. A
/// session can therefore appear idle, or be started again, while the prior
/// submission is still in flight. That race is reproduced deliberately;
/// adding synchronization here would change observable timing.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    stabilizer: ScanStabilizer,
    active: bool,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Arm the session. Starting an already-active session is a no-op.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        debug!("scan session started");
    }

    /// Feed one raw read. Reads are ignored while the session is inactive.
    ///
    /// Returns the confirmed code once a stable run is detected; the session
    /// is inactive from that point until `start` is called again.
    pub fn observe(&mut self, code: &str) -> Option<String> {
        if !self.active {
            return None;
        }

        let confirmed = self.stabilizer.observe(code)?;
        self.active = false;
        debug!(code = %confirmed, "code confirmed, scanning disabled");
        Some(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_sessions_ignore_reads() {
        let mut session = ScanSession::new();
        assert_eq!(session.observe("A"), None);
        assert_eq!(session.observe("A"), None);
        assert_eq!(session.observe("A"), None);
        assert!(!session.is_active());
    }

    #[test]
    fn confirmation_deactivates_immediately() {
        let mut session = ScanSession::new();
        session.start();

        assert_eq!(session.observe("A"), None);
        assert_eq!(session.observe("A"), None);
        assert_eq!(session.observe("A"), Some("A".to_string()));

        // Deactivated on the confirming call itself, before any submission
        // of the code could have resolved.
        assert!(!session.is_active());
        assert_eq!(session.observe("A"), None);
    }

    #[test]
    fn restart_resumes_the_same_stabilizer_state() {
        let mut session = ScanSession::new();
        session.start();
        for _ in 0..3 {
            session.observe("A");
        }
        assert!(!session.is_active());

        session.start();
        // "A" is still the last confirmed code; only a different stable code
        // can confirm next.
        assert_eq!(session.observe("A"), None);
        session.observe("B");
        session.observe("B");
        assert_eq!(session.observe("B"), Some("B".to_string()));
    }

    #[test]
    fn starting_twice_is_harmless() {
        let mut session = ScanSession::new();
        session.start();
        session.start();
        assert!(session.is_active());
    }
}
