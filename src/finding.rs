//! Non-fatal conformance deviations noted while parsing a universal overlay
//! from an untrusted octet source (§3, §4.4). Findings never fail a parse;
//! they are attached to the overlay for the caller to inspect.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding(pub String);

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        log::debug!("finding: {}", message);
        Finding(message)
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
