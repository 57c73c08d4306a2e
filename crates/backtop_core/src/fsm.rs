//! Flat state machines over small `Copy` enums.
//!
//! The floating control keeps its modes here (normal vs. suspended
//! visibility). Edges are matched in declaration order; an event with no
//! edge from the current state is ignored.

use std::fmt;

use smallvec::SmallVec;

/// One `(from, event) -> to` edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Transition<S, E> {
    from_state: S,
    event: E,
    to_state: S,
}

/// Collects edges for a [`StateMachine`]
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: SmallVec<[Transition<S, E>; 4]>,
}

impl<S: Copy + PartialEq, E: Copy + PartialEq> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: SmallVec::new(),
        }
    }

    /// `from --event--> to`
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition {
            from_state: from,
            event,
            to_state: to,
        });
        self
    }

    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            initial_state: self.initial_state,
            current_state: self.initial_state,
            transitions: self.transitions,
        }
    }
}

/// Current state plus its edge table
pub struct StateMachine<S, E> {
    initial_state: S,
    current_state: S,
    transitions: SmallVec<[Transition<S, E>; 4]>,
}

impl<S: Copy + PartialEq, E: Copy + PartialEq> StateMachine<S, E> {
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.current_state = self.initial_state;
    }

    /// Deliver `event` and return the resulting state
    pub fn send(&mut self, event: E) -> S {
        let from = self.current_state;
        if let Some(edge) = self
            .transitions
            .iter()
            .find(|edge| edge.from_state == from && edge.event == event)
        {
            self.current_state = edge.to_state;
        }
        self.current_state
    }
}

impl<S: fmt::Debug, E> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current_state", &self.current_state)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Idle,
        Busy,
        Done,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ev {
        Start,
        Finish,
        Reset,
    }

    fn machine() -> StateMachine<Mode, Ev> {
        StateMachine::builder(Mode::Idle)
            .on(Mode::Idle, Ev::Start, Mode::Busy)
            .on(Mode::Busy, Ev::Finish, Mode::Done)
            .on(Mode::Done, Ev::Reset, Mode::Idle)
            .build()
    }

    #[test]
    fn follows_declared_edges() {
        let mut fsm = machine();
        assert_eq!(fsm.current_state(), Mode::Idle);

        assert_eq!(fsm.send(Ev::Start), Mode::Busy);
        assert_eq!(fsm.send(Ev::Finish), Mode::Done);
        assert_eq!(fsm.send(Ev::Reset), Mode::Idle);
    }

    #[test]
    fn unmatched_event_keeps_state() {
        let mut fsm = machine();

        // Finish is not valid while idle
        assert_eq!(fsm.send(Ev::Finish), Mode::Idle);
        assert!(fsm.is_in(Mode::Idle));
    }

    #[test]
    fn first_matching_edge_wins() {
        let mut fsm = StateMachine::builder(Mode::Idle)
            .on(Mode::Idle, Ev::Start, Mode::Busy)
            .on(Mode::Idle, Ev::Start, Mode::Done)
            .build();

        assert_eq!(fsm.send(Ev::Start), Mode::Busy);
    }

    #[test]
    fn reset_restores_initial() {
        let mut fsm = machine();
        fsm.send(Ev::Start);
        fsm.reset();

        assert!(fsm.is_in(Mode::Idle));
    }
}
