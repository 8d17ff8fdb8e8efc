//! Client configuration.

use std::time::Duration;

/// Quiet period after the last text change before `stopTyping` is emitted.
pub const DEFAULT_TYPING_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Grace window after which a peer with no fresh `typing` signal is dropped
/// from the typing set.
pub const DEFAULT_PEER_TYPING_TTL: Duration = Duration::from_secs(5);

/// When the local client announces `typing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingSignal {
    /// On every text change while the text is non-empty. Keeps remote
    /// indicators fresh at the cost of one event per keystroke.
    #[default]
    EveryChange,
    /// Only on the Idle to Typing edge.
    EdgeOnly,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Debounce window for the local `stopTyping` timer.
    pub typing_debounce: Duration,
    /// Expiry for peer typing entries. `None` keeps entries until an explicit
    /// `stopTyping` arrives.
    pub peer_typing_ttl: Option<Duration>,
    /// Outbound `typing` policy.
    pub typing_signal: TypingSignal,
    /// Drop inbound messages whose id is already in the log.
    pub dedupe_messages: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            typing_debounce: DEFAULT_TYPING_DEBOUNCE,
            peer_typing_ttl: Some(DEFAULT_PEER_TYPING_TTL),
            typing_signal: TypingSignal::default(),
            dedupe_messages: true,
        }
    }
}

impl ClientConfig {
    /// Set the local typing debounce window.
    #[must_use]
    pub fn with_typing_debounce(mut self, debounce: Duration) -> Self {
        self.typing_debounce = debounce;
        self
    }

    /// Set or disable peer typing expiry.
    #[must_use]
    pub fn with_peer_typing_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.peer_typing_ttl = ttl;
        self
    }

    /// Set the outbound `typing` policy.
    #[must_use]
    pub fn with_typing_signal(mut self, signal: TypingSignal) -> Self {
        self.typing_signal = signal;
        self
    }

    /// Enable or disable id-based deduplication of inbound messages.
    #[must_use]
    pub fn with_dedupe_messages(mut self, dedupe: bool) -> Self {
        self.dedupe_messages = dedupe;
        self
    }
}
