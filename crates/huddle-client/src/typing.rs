//! Typing presence.
//!
//! Tracks two asymmetric sides of the same signal:
//!
//! - **Self** (outbound): every text change re-arms a single-shot debounce
//!   timer. When the timer expires without a further change, `stopTyping` is
//!   emitted. `typing` is emitted on non-empty changes.
//! - **Peers** (inbound): a set of names, inserted on `typing` and removed on
//!   `stopTyping`, with optional expiry for peers whose `stopTyping` never
//!   arrives.
//!
//! # Self State Machine
//!
//! ```text
//!            non-empty change / emit typing, arm timer
//!        ┌──────────────────────────────────────────────┐
//!        │                                              ↓
//!   ┌────────┐   timer expired / emit stopTyping   ┌────────┐
//!   │  Idle  │<────────────────────────────────────│ Typing │──┐ any change /
//!   └────────┘                                     └────────┘<─┘ re-arm timer
//! ```
//!
//! Clearing the text does not emit `stopTyping` by itself; it re-arms the
//! timer like any other change. A replaced timer never fires.
//!
//! Time is passed in by the caller, so the tracker is a pure state machine.

use std::{ops::Sub, time::Duration};

use huddle_core::OutboundEvent;

use crate::config::{ClientConfig, TypingSignal};

/// The armed debounce timer. At most one exists at a time.
#[derive(Debug, Clone)]
struct DebounceTimer<I> {
    /// When the last text change happened.
    armed_at: I,
    /// Name to announce in `stopTyping`.
    name: String,
}

/// A peer currently shown as typing.
#[derive(Debug, Clone)]
struct PeerTyping<I> {
    name: String,
    /// Last `typing` signal received from this peer.
    last_seen: I,
}

/// Typing presence for the local user and observed peers.
#[derive(Debug, Clone)]
pub struct TypingTracker<I> {
    debounce: Duration,
    signal: TypingSignal,
    peer_ttl: Option<Duration>,
    /// Single debounce slot. Re-arming replaces it.
    timer: Option<DebounceTimer<I>>,
    /// `typing` was announced and `stopTyping` has not been emitted since.
    announced: bool,
    /// Peers in the order they started typing.
    peers: Vec<PeerTyping<I>>,
}

impl<I> TypingTracker<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle tracker.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            debounce: config.typing_debounce,
            signal: config.typing_signal,
            peer_ttl: config.peer_typing_ttl,
            timer: None,
            announced: false,
            peers: Vec::new(),
        }
    }

    /// Local composer text changed.
    ///
    /// Re-arms the debounce timer unconditionally and returns the `typing`
    /// event to emit, if any.
    pub fn text_changed(&mut self, text: &str, self_name: &str, now: I) -> Option<OutboundEvent> {
        self.timer = Some(DebounceTimer { armed_at: now, name: self_name.to_string() });

        if text.is_empty() {
            return None;
        }

        let emit = match self.signal {
            TypingSignal::EveryChange => true,
            TypingSignal::EdgeOnly => !self.announced,
        };
        self.announced = true;

        emit.then(|| OutboundEvent::Typing(self_name.to_string()))
    }

    /// Fire the debounce timer if its quiet period has elapsed.
    ///
    /// Returns the `stopTyping` event at most once per armed timer.
    pub fn poll_timer(&mut self, now: I) -> Option<OutboundEvent> {
        let expired = self.timer.as_ref().is_some_and(|t| now - t.armed_at >= self.debounce);
        if !expired {
            return None;
        }

        let timer = self.timer.take()?;
        self.announced = false;
        Some(OutboundEvent::StopTyping(timer.name))
    }

    /// Drop the armed timer without emitting anything.
    pub fn cancel(&mut self) {
        self.timer = None;
        self.announced = false;
    }

    /// Whether a debounce timer is armed.
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether the local user is in the Typing state.
    pub fn is_self_typing(&self) -> bool {
        self.announced
    }

    /// Peer sent `typing`. Returns true if the set changed.
    ///
    /// A repeated signal only refreshes the peer's expiry.
    pub fn peer_typing(&mut self, name: &str, now: I) -> bool {
        if let Some(peer) = self.peers.iter_mut().find(|p| p.name == name) {
            peer.last_seen = now;
            return false;
        }
        self.peers.push(PeerTyping { name: name.to_string(), last_seen: now });
        true
    }

    /// Peer sent `stopTyping`. Returns true if the set changed.
    pub fn peer_stopped(&mut self, name: &str) -> bool {
        let before = self.peers.len();
        self.peers.retain(|p| p.name != name);
        self.peers.len() != before
    }

    /// Evict peers whose last `typing` is older than the expiry window.
    ///
    /// Returns the evicted names. Always empty when expiry is disabled.
    pub fn sweep(&mut self, now: I) -> Vec<String> {
        let Some(ttl) = self.peer_ttl else {
            return Vec::new();
        };

        let (expired, alive): (Vec<_>, Vec<_>) =
            self.peers.drain(..).partition(|p| now - p.last_seen >= ttl);
        self.peers = alive;
        expired.into_iter().map(|p| p.name).collect()
    }

    /// Names currently typing, in the order they started.
    pub fn typers(&self) -> impl Iterator<Item = &str> {
        self.peers.iter().map(|p| p.name.as_str())
    }

    /// Whether `name` is currently shown as typing.
    pub fn is_peer_typing(&self, name: &str) -> bool {
        self.peers.iter().any(|p| p.name == name)
    }

    /// Time until the debounce timer fires or the oldest peer expires,
    /// whichever is first. `None` if nothing is pending.
    pub fn time_until_next_deadline(&self, now: I) -> Option<Duration> {
        let timer = self.timer.as_ref().map(|t| self.debounce.saturating_sub(now - t.armed_at));
        let expiry = self.peer_ttl.and_then(|ttl| {
            self.peers.iter().map(|p| ttl.saturating_sub(now - p.last_seen)).min()
        });

        match (timer, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Virtual instant in milliseconds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Ms(u64);

    impl Sub for Ms {
        type Output = Duration;
        fn sub(self, rhs: Self) -> Duration {
            Duration::from_millis(self.0.saturating_sub(rhs.0))
        }
    }

    fn tracker() -> TypingTracker<Ms> {
        TypingTracker::new(&ClientConfig::default())
    }

    fn stop(name: &str) -> Option<OutboundEvent> {
        Some(OutboundEvent::StopTyping(name.into()))
    }

    #[test]
    fn every_non_empty_change_emits_typing() {
        let mut t = tracker();
        for (i, text) in ["h", "hi", "hi!"].iter().enumerate() {
            let event = t.text_changed(text, "Alice", Ms(i as u64 * 10));
            assert_eq!(event, Some(OutboundEvent::Typing("Alice".into())));
        }
    }

    #[test]
    fn edge_only_emits_once_per_burst() {
        let config = ClientConfig::default().with_typing_signal(TypingSignal::EdgeOnly);
        let mut t = TypingTracker::new(&config);

        assert!(t.text_changed("h", "Alice", Ms(0)).is_some());
        assert!(t.text_changed("hi", "Alice", Ms(100)).is_none());
        assert_eq!(t.poll_timer(Ms(1_100)), stop("Alice"));
        assert!(t.text_changed("hi!", "Alice", Ms(2_000)).is_some());
    }

    #[test]
    fn timer_fires_after_quiet_period() {
        let mut t = tracker();
        t.text_changed("h", "Alice", Ms(0));

        assert_eq!(t.poll_timer(Ms(999)), None);
        assert_eq!(t.poll_timer(Ms(1_000)), stop("Alice"));
        assert_eq!(t.poll_timer(Ms(5_000)), None);
        assert!(!t.is_armed());
    }

    #[test]
    fn rearm_cancels_previous_timer() {
        let mut t = tracker();
        t.text_changed("a", "Alice", Ms(0));
        t.text_changed("ab", "Alice", Ms(200));
        t.text_changed("abc", "Alice", Ms(900));

        // The first two deadlines pass without firing.
        assert_eq!(t.poll_timer(Ms(1_000)), None);
        assert_eq!(t.poll_timer(Ms(1_200)), None);
        assert_eq!(t.poll_timer(Ms(1_899)), None);
        assert_eq!(t.poll_timer(Ms(1_900)), stop("Alice"));
    }

    #[test]
    fn clearing_text_waits_for_timer() {
        let mut t = tracker();
        t.text_changed("hi", "Alice", Ms(0));

        assert_eq!(t.text_changed("", "Alice", Ms(300)), None);
        assert!(t.is_self_typing());
        assert_eq!(t.poll_timer(Ms(1_000)), None);
        assert_eq!(t.poll_timer(Ms(1_300)), stop("Alice"));
        assert!(!t.is_self_typing());
    }

    #[test]
    fn empty_change_still_arms_timer() {
        let mut t = tracker();
        assert_eq!(t.text_changed("", "Alice", Ms(0)), None);
        assert_eq!(t.poll_timer(Ms(1_000)), stop("Alice"));
    }

    #[test]
    fn cancel_is_silent() {
        let mut t = tracker();
        t.text_changed("hi", "Alice", Ms(0));
        t.cancel();
        assert_eq!(t.poll_timer(Ms(10_000)), None);
    }

    #[test]
    fn peer_insert_and_remove_are_idempotent() {
        let mut t = tracker();
        assert!(t.peer_typing("Bob", Ms(0)));
        assert!(!t.peer_typing("Bob", Ms(10)));
        assert_eq!(t.typers().collect::<Vec<_>>(), ["Bob"]);

        assert!(t.peer_stopped("Bob"));
        assert!(!t.peer_stopped("Bob"));
        assert_eq!(t.typers().count(), 0);
    }

    #[test]
    fn typers_keep_arrival_order() {
        let mut t = tracker();
        t.peer_typing("Carol", Ms(0));
        t.peer_typing("Bob", Ms(1));
        t.peer_typing("Carol", Ms(2));
        assert_eq!(t.typers().collect::<Vec<_>>(), ["Carol", "Bob"]);
    }

    #[test]
    fn stale_peer_expires() {
        let mut t = tracker();
        t.peer_typing("Bob", Ms(0));
        t.peer_typing("Carol", Ms(3_000));

        assert!(t.sweep(Ms(4_999)).is_empty());
        assert_eq!(t.sweep(Ms(5_000)), ["Bob"]);
        assert_eq!(t.typers().collect::<Vec<_>>(), ["Carol"]);
    }

    #[test]
    fn fresh_signal_postpones_expiry() {
        let mut t = tracker();
        t.peer_typing("Bob", Ms(0));
        t.peer_typing("Bob", Ms(4_000));
        assert!(t.sweep(Ms(6_000)).is_empty());
        assert_eq!(t.sweep(Ms(9_000)), ["Bob"]);
    }

    #[test]
    fn expiry_disabled_keeps_peers_forever() {
        let config = ClientConfig::default().with_peer_typing_ttl(None);
        let mut t = TypingTracker::new(&config);
        t.peer_typing("Bob", Ms(0));
        assert!(t.sweep(Ms(u64::MAX)).is_empty());
        assert!(t.is_peer_typing("Bob"));
        assert_eq!(t.time_until_next_deadline(Ms(0)), None);
    }

    #[test]
    fn next_deadline_is_earliest_pending() {
        let mut t = tracker();
        assert_eq!(t.time_until_next_deadline(Ms(0)), None);

        t.peer_typing("Bob", Ms(0));
        t.text_changed("x", "Alice", Ms(4_500));
        assert_eq!(t.time_until_next_deadline(Ms(4_600)), Some(Duration::from_millis(400)));

        t.text_changed("xy", "Alice", Ms(4_700));
        assert_eq!(t.time_until_next_deadline(Ms(4_700)), Some(Duration::from_millis(300)));
    }
}
