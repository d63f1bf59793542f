//! Transport lifecycle and the transition table.
//!
//! Every state change goes through [`transition`], keyed by the current state
//! and the event that happened:
//!
//! ```text
//!  Initial ──StartConnect──► Connecting ──HandshakeSucceeded──► Connected
//!                                │                                │  │
//!                          HandshakeFailed                 StartClose │ PollShutdown
//!                                ▼                                ▼  ▼
//!                              Failed ◄──PollRejected──────── Closing ──► Closed
//!                                      PollUnexpected/SendFailed      any poll
//!                                                                     completion,
//!                                                                     CloseSettled
//! ```

use std::fmt;

/// Transport lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportState {
    /// Created, not started.
    Initial,
    /// Handshake in flight.
    Connecting,
    /// Handshake accepted; polling and sending.
    Connected,
    /// DELETE issued, waiting for the close to settle.
    Closing,
    /// Closed gracefully.
    Closed,
    /// Failed; see the transport's error reason.
    Failed,
}

impl TransportState {
    /// Check if the state is terminal (no reuse).
    pub fn is_terminal(self) -> bool {
        matches!(self, TransportState::Closed | TransportState::Failed)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportState::Initial => "initial",
            TransportState::Connecting => "connecting",
            TransportState::Connected => "connected",
            TransportState::Closing => "closing",
            TransportState::Closed => "closed",
            TransportState::Failed => "failed",
        })
    }
}

/// Something that happened to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The owner asked to connect.
    StartConnect,
    /// Handshake answered with a 2xx status.
    HandshakeSucceeded,
    /// Handshake answered with an error status or never finished.
    HandshakeFailed,
    /// The owner asked to close.
    StartClose,
    /// Poll answered 200.
    PollData,
    /// Poll answered 204: the server shut the connection down.
    PollShutdown,
    /// Poll answered 400 or 404.
    PollRejected,
    /// Poll answered with any other status.
    PollUnexpected,
    /// Poll never produced a response.
    PollInterrupted,
    /// Send answered with an error status or ran out of retries.
    SendFailed,
    /// DELETE succeeded or ran out of retries.
    CloseSettled,
}

/// Work to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing further.
    Nothing,
    /// Issue the handshake POST.
    Handshake,
    /// Flush queued frames and issue the first poll.
    BeginStreaming,
    /// Hand the poll payload to the hub, then poll again.
    DispatchAndPoll,
    /// Poll again.
    Poll,
    /// Issue the first DELETE.
    Delete,
}

/// Result of applying an event to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The event has no effect in this state.
    Ignore,
    /// Stay in the current state and perform the action.
    Stay(Action),
    /// Move to a new state and perform the action.
    Enter(TransportState, Action),
}

impl Step {
    /// The action to perform, `Nothing` when ignored.
    pub fn action(self) -> Action {
        match self {
            Step::Ignore => Action::Nothing,
            Step::Stay(action) | Step::Enter(_, action) => action,
        }
    }
}

/// Decide what `event` does to a transport in `state`.
pub fn transition(state: TransportState, event: Event) -> Step {
    use Action::*;
    use Event::*;
    use TransportState::*;

    match (state, event) {
        (Closed | Failed, _) => Step::Ignore,

        (Initial, StartConnect) => Step::Enter(Connecting, Handshake),

        (Connecting, HandshakeSucceeded) => Step::Enter(Connected, BeginStreaming),
        (Connecting, HandshakeFailed) => Step::Enter(Failed, Nothing),

        (Connected, StartClose) => Step::Enter(Closing, Delete),
        (Connected, PollData) => Step::Stay(DispatchAndPoll),
        (Connected, PollInterrupted) => Step::Stay(Poll),
        (Connected, PollShutdown) => Step::Enter(Closed, Nothing),
        (Connected, PollRejected | PollUnexpected | SendFailed) => Step::Enter(Failed, Nothing),

        // A close races the outstanding poll; whichever completes settles it.
        (
            Closing,
            PollData | PollShutdown | PollRejected | PollUnexpected | PollInterrupted
            | CloseSettled,
        ) => Step::Enter(Closed, Nothing),

        _ => Step::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [Event; 11] = [
        Event::StartConnect,
        Event::HandshakeSucceeded,
        Event::HandshakeFailed,
        Event::StartClose,
        Event::PollData,
        Event::PollShutdown,
        Event::PollRejected,
        Event::PollUnexpected,
        Event::PollInterrupted,
        Event::SendFailed,
        Event::CloseSettled,
    ];

    #[test]
    fn test_terminal_states_ignore_everything() {
        for state in [TransportState::Closed, TransportState::Failed] {
            for event in ALL_EVENTS {
                assert_eq!(transition(state, event), Step::Ignore, "{state} {event:?}");
            }
        }
    }

    #[test]
    fn test_connect_only_from_initial() {
        assert_eq!(
            transition(TransportState::Initial, Event::StartConnect),
            Step::Enter(TransportState::Connecting, Action::Handshake)
        );
        for state in [
            TransportState::Connecting,
            TransportState::Connected,
            TransportState::Closing,
        ] {
            assert_eq!(transition(state, Event::StartConnect), Step::Ignore);
        }
    }

    #[test]
    fn test_handshake_outcomes() {
        assert_eq!(
            transition(TransportState::Connecting, Event::HandshakeSucceeded),
            Step::Enter(TransportState::Connected, Action::BeginStreaming)
        );
        assert_eq!(
            transition(TransportState::Connecting, Event::HandshakeFailed),
            Step::Enter(TransportState::Failed, Action::Nothing)
        );
    }

    #[test]
    fn test_connected_poll_outcomes() {
        let s = TransportState::Connected;
        assert_eq!(transition(s, Event::PollData), Step::Stay(Action::DispatchAndPoll));
        assert_eq!(transition(s, Event::PollInterrupted), Step::Stay(Action::Poll));
        assert_eq!(
            transition(s, Event::PollShutdown),
            Step::Enter(TransportState::Closed, Action::Nothing)
        );
        assert_eq!(
            transition(s, Event::PollRejected),
            Step::Enter(TransportState::Failed, Action::Nothing)
        );
        assert_eq!(
            transition(s, Event::PollUnexpected),
            Step::Enter(TransportState::Failed, Action::Nothing)
        );
    }

    #[test]
    fn test_closing_always_settles_closed() {
        let s = TransportState::Closing;
        for event in [
            Event::PollData,
            Event::PollShutdown,
            Event::PollRejected,
            Event::PollUnexpected,
            Event::PollInterrupted,
            Event::CloseSettled,
        ] {
            assert_eq!(
                transition(s, event),
                Step::Enter(TransportState::Closed, Action::Nothing),
                "{event:?}"
            );
        }
        assert_eq!(transition(s, Event::SendFailed), Step::Ignore);
        assert_eq!(transition(s, Event::StartClose), Step::Ignore);
    }

    #[test]
    fn test_close_only_from_connected() {
        assert_eq!(
            transition(TransportState::Connected, Event::StartClose),
            Step::Enter(TransportState::Closing, Action::Delete)
        );
        assert_eq!(transition(TransportState::Initial, Event::StartClose), Step::Ignore);
        assert_eq!(transition(TransportState::Connecting, Event::StartClose), Step::Ignore);
    }

    #[test]
    fn test_step_action() {
        assert_eq!(Step::Ignore.action(), Action::Nothing);
        assert_eq!(Step::Stay(Action::Poll).action(), Action::Poll);
        assert_eq!(
            Step::Enter(TransportState::Closing, Action::Delete).action(),
            Action::Delete
        );
    }
}
