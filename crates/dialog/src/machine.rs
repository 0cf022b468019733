use keygate_provider::{is_http_url, Credential};

pub const INVALID_URL_MESSAGE: &str = "Enter a valid URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Open,
    /// A probe is in flight; further submits are refused.
    Submitting,
    Closed(CloseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Accepted,
    Cancelled(CancelSource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSource {
    CloseButton,
    Backdrop,
    Escape,
    /// A newer dialog replaced this one.
    Superseded,
    /// The presenter went away without closing the dialog.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    Busy,
    Closed,
    InvalidUrl,
}

/// Transition rules of one dialog session, independent of any UI or runtime.
#[derive(Debug, Clone)]
pub struct DialogMachine {
    phase: DialogPhase,
    error: Option<String>,
}

impl Default for DialogMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogMachine {
    pub fn new() -> Self {
        Self {
            phase: DialogPhase::Open,
            error: None,
        }
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, DialogPhase::Closed(_))
    }

    /// Open → Submitting. Values are trimmed; a URL without an http(s)
    /// scheme leaves the dialog open with an inline error.
    pub fn submit(&mut self, base_url: &str, api_key: &str) -> Result<Credential, SubmitRejection> {
        match self.phase {
            DialogPhase::Open => {}
            DialogPhase::Submitting => return Err(SubmitRejection::Busy),
            DialogPhase::Closed(_) => return Err(SubmitRejection::Closed),
        }

        let base_url = base_url.trim();
        if !is_http_url(base_url) {
            self.error = Some(INVALID_URL_MESSAGE.to_string());
            return Err(SubmitRejection::InvalidUrl);
        }

        self.error = None;
        self.phase = DialogPhase::Submitting;
        Ok(Credential::new(base_url, api_key.trim()))
    }

    /// Submitting → Open with the failure shown inline.
    pub fn submission_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != DialogPhase::Submitting {
            return false;
        }
        self.error = Some(message.into());
        self.phase = DialogPhase::Open;
        true
    }

    /// Submitting → Closed(Accepted).
    pub fn accept(&mut self) -> bool {
        if self.phase != DialogPhase::Submitting {
            return false;
        }
        self.phase = DialogPhase::Closed(CloseReason::Accepted);
        true
    }

    pub fn cancel(&mut self, source: CancelSource) -> bool {
        if self.is_closed() {
            return false;
        }
        self.phase = DialogPhase::Closed(CloseReason::Cancelled(source));
        true
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_submit_moves_to_submitting_with_trimmed_values() {
        let mut machine = DialogMachine::new();
        let credential = machine.submit("  https://a.test/v1 ", " sk-1\t").unwrap();

        assert_eq!(credential, Credential::new("https://a.test/v1", "sk-1"));
        assert_eq!(machine.phase(), DialogPhase::Submitting);
        assert_eq!(machine.error(), None);
    }

    #[test]
    fn invalid_url_stays_open_with_inline_error() {
        let mut machine = DialogMachine::new();
        assert_eq!(
            machine.submit("api.openai.com", "sk-1"),
            Err(SubmitRejection::InvalidUrl)
        );
        assert_eq!(machine.phase(), DialogPhase::Open);
        assert_eq!(machine.error(), Some(INVALID_URL_MESSAGE));
    }

    #[test]
    fn second_submit_while_probing_is_busy() {
        let mut machine = DialogMachine::new();
        machine.submit("https://a.test", "").unwrap();
        assert_eq!(
            machine.submit("https://b.test", ""),
            Err(SubmitRejection::Busy)
        );
        assert_eq!(machine.phase(), DialogPhase::Submitting);
    }

    #[test]
    fn failure_reopens_and_retry_clears_error() {
        let mut machine = DialogMachine::new();
        machine.submit("https://a.test", "bad").unwrap();
        assert!(machine.submission_failed("Invalid API key or URL"));
        assert_eq!(machine.phase(), DialogPhase::Open);
        assert_eq!(machine.error(), Some("Invalid API key or URL"));

        machine.submit("https://a.test", "good").unwrap();
        assert_eq!(machine.error(), None);
        assert!(machine.accept());
        assert_eq!(machine.phase(), DialogPhase::Closed(CloseReason::Accepted));
    }

    #[test]
    fn results_outside_submitting_are_ignored() {
        let mut machine = DialogMachine::new();
        assert!(!machine.accept());
        assert!(!machine.submission_failed("late"));
        assert_eq!(machine.phase(), DialogPhase::Open);
        assert_eq!(machine.error(), None);
    }

    #[test]
    fn cancel_wins_over_in_flight_probe() {
        let mut machine = DialogMachine::new();
        machine.submit("https://a.test", "").unwrap();
        assert!(machine.cancel(CancelSource::Escape));

        assert!(!machine.accept());
        assert!(!machine.cancel(CancelSource::Backdrop));
        assert_eq!(
            machine.phase(),
            DialogPhase::Closed(CloseReason::Cancelled(CancelSource::Escape))
        );
        assert_eq!(
            machine.submit("https://a.test", ""),
            Err(SubmitRejection::Closed)
        );
    }

    #[test]
    fn dismiss_error_keeps_phase() {
        let mut machine = DialogMachine::new();
        let _ = machine.submit("nope", "");
        machine.dismiss_error();
        assert_eq!(machine.error(), None);
        assert_eq!(machine.phase(), DialogPhase::Open);
    }
}
