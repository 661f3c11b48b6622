//! Forum vote transitions.
//!
//! Each (voter, post) pair is in one of three states. Casting a vote moves
//! the pair to its next state and yields the change to apply to the post's
//! `upvotes`/`downvotes` counters. The database layer applies the table
//! inside a transaction; [`OptimisticVote`] applies the same table to a
//! client's local copy of the counters before the server has answered.

use serde::{Deserialize, Serialize};

/// Direction of a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Value stored in the `vote_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Current vote of one voter on one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl VoteState {
    /// The direction held in this state, if any.
    #[must_use]
    pub const fn direction(self) -> Option<VoteDirection> {
        match self {
            Self::None => None,
            Self::Up => Some(VoteDirection::Up),
            Self::Down => Some(VoteDirection::Down),
        }
    }
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(direction: Option<VoteDirection>) -> Self {
        match direction {
            None => Self::None,
            Some(VoteDirection::Up) => Self::Up,
            Some(VoteDirection::Down) => Self::Down,
        }
    }
}

impl From<VoteDirection> for VoteState {
    fn from(direction: VoteDirection) -> Self {
        Some(direction).into()
    }
}

/// What happened to the vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    /// A new row was inserted.
    Added,
    /// The existing row changed direction.
    Updated,
    /// The existing row was deleted (toggle off).
    Removed,
}

/// Signed change to a post's vote counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl CounterDelta {
    const fn new(upvotes: i32, downvotes: i32) -> Self {
        Self { upvotes, downvotes }
    }

    /// Net effect on the score (`upvotes - downvotes`).
    #[must_use]
    pub const fn score(self) -> i32 {
        self.upvotes - self.downvotes
    }
}

/// Outcome of applying one cast to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: VoteState,
    pub delta: CounterDelta,
    pub action: VoteAction,
}

/// The vote transition table.
///
/// | current | cast | next | upvotes | downvotes |
/// |---------|------|------|---------|-----------|
/// | none    | up   | up   | +1      |           |
/// | none    | down | down |         | +1        |
/// | up      | up   | none | -1      |           |
/// | up      | down | down | -1      | +1        |
/// | down    | down | none |         | -1        |
/// | down    | up   | up   | +1      | -1        |
#[must_use]
pub const fn transition(current: VoteState, cast: VoteDirection) -> Transition {
    use VoteAction::{Added, Removed, Updated};

    let (next, delta, action) = match (current, cast) {
        (VoteState::None, VoteDirection::Up) => (VoteState::Up, CounterDelta::new(1, 0), Added),
        (VoteState::None, VoteDirection::Down) => {
            (VoteState::Down, CounterDelta::new(0, 1), Added)
        }
        (VoteState::Up, VoteDirection::Up) => (VoteState::None, CounterDelta::new(-1, 0), Removed),
        (VoteState::Up, VoteDirection::Down) => {
            (VoteState::Down, CounterDelta::new(-1, 1), Updated)
        }
        (VoteState::Down, VoteDirection::Down) => {
            (VoteState::None, CounterDelta::new(0, -1), Removed)
        }
        (VoteState::Down, VoteDirection::Up) => (VoteState::Up, CounterDelta::new(1, -1), Updated),
    };

    Transition {
        next,
        delta,
        action,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    state: VoteState,
    upvotes: i32,
    downvotes: i32,
}

/// Client-side view of one post's vote, updated before the server answers.
///
/// A cast applies [`transition`] locally and remembers the prior state.
/// While a cast is in flight further casts are ignored. The caller then
/// either [`confirm`](Self::confirm)s with the server's numbers or
/// [`revert`](Self::revert)s to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticVote {
    current: Snapshot,
    pending: Option<Snapshot>,
}

impl OptimisticVote {
    /// Start from the state and counters last seen from the server.
    #[must_use]
    pub const fn new(state: VoteState, upvotes: i32, downvotes: i32) -> Self {
        Self {
            current: Snapshot {
                state,
                upvotes,
                downvotes,
            },
            pending: None,
        }
    }

    /// Apply a cast locally.
    ///
    /// Returns `None` without changing anything when another cast is still
    /// pending.
    pub fn cast(&mut self, direction: VoteDirection) -> Option<Transition> {
        if self.pending.is_some() {
            return None;
        }

        let step = transition(self.current.state, direction);
        self.pending = Some(self.current);
        self.current = Snapshot {
            state: step.next,
            upvotes: (self.current.upvotes + step.delta.upvotes).max(0),
            downvotes: (self.current.downvotes + step.delta.downvotes).max(0),
        };
        Some(step)
    }

    /// Adopt the server's authoritative result for the pending cast.
    pub fn confirm(&mut self, state: VoteState, upvotes: i32, downvotes: i32) {
        self.current = Snapshot {
            state,
            upvotes,
            downvotes,
        };
        self.pending = None;
    }

    /// Undo the pending cast after a failed server call.
    pub fn revert(&mut self) {
        if let Some(snapshot) = self.pending.take() {
            self.current = snapshot;
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn state(&self) -> VoteState {
        self.current.state
    }

    #[must_use]
    pub const fn upvotes(&self) -> i32 {
        self.current.upvotes
    }

    #[must_use]
    pub const fn downvotes(&self) -> i32 {
        self.current.downvotes
    }

    #[must_use]
    pub const fn score(&self) -> i32 {
        self.current.upvotes - self.current.downvotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS: [VoteDirection; 2] = [VoteDirection::Up, VoteDirection::Down];

    /// Every sequence of casts up to `len` long.
    fn sequences(len: usize) -> Vec<Vec<VoteDirection>> {
        let mut all = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..len {
            let mut next = Vec::new();
            for seq in &frontier {
                for dir in DIRECTIONS {
                    let mut extended: Vec<VoteDirection> = seq.clone();
                    extended.push(dir);
                    next.push(extended);
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    #[test]
    fn test_table() {
        let cases = [
            (VoteState::None, VoteDirection::Up, VoteState::Up, 1, 0, VoteAction::Added),
            (VoteState::None, VoteDirection::Down, VoteState::Down, 0, 1, VoteAction::Added),
            (VoteState::Up, VoteDirection::Up, VoteState::None, -1, 0, VoteAction::Removed),
            (VoteState::Up, VoteDirection::Down, VoteState::Down, -1, 1, VoteAction::Updated),
            (VoteState::Down, VoteDirection::Down, VoteState::None, 0, -1, VoteAction::Removed),
            (VoteState::Down, VoteDirection::Up, VoteState::Up, 1, -1, VoteAction::Updated),
        ];

        for (current, cast, next, up, down, action) in cases {
            let step = transition(current, cast);
            assert_eq!(step.next, next, "{current:?} + {cast:?}");
            assert_eq!(step.delta, CounterDelta::new(up, down), "{current:?} + {cast:?}");
            assert_eq!(step.action, action, "{current:?} + {cast:?}");
        }
    }

    #[test]
    fn test_fold_matches_final_state() {
        for seq in sequences(6) {
            let mut state = VoteState::None;
            let mut up = 0;
            let mut down = 0;
            for &dir in &seq {
                let step = transition(state, dir);
                state = step.next;
                up += step.delta.upvotes;
                down += step.delta.downvotes;
            }

            // One voter contributes at most one row, so the counters equal
            // the indicator of the final state.
            let expected = match state {
                VoteState::None => (0, 0),
                VoteState::Up => (1, 0),
                VoteState::Down => (0, 1),
            };
            assert_eq!((up, down), expected, "sequence {seq:?}");
        }
    }

    #[test]
    fn test_same_direction_twice_is_identity() {
        for start in [VoteState::None, VoteState::Up, VoteState::Down] {
            for dir in DIRECTIONS {
                let first = transition(start, dir);
                let second = transition(first.next, dir);
                if start.direction() != Some(dir) {
                    // none -> dir -> none, or flip then toggle off
                    assert_eq!(second.next, VoteState::None);
                }
                if start == VoteState::None {
                    let total = CounterDelta::new(
                        first.delta.upvotes + second.delta.upvotes,
                        first.delta.downvotes + second.delta.downvotes,
                    );
                    assert_eq!(total, CounterDelta::default());
                }
            }
        }
    }

    #[test]
    fn test_two_voters_scenario() {
        // A: up, up, down. B: down.
        let mut a = VoteState::None;
        let mut b = VoteState::None;
        let mut up = 0;
        let mut down = 0;

        for (voter, dir) in [
            ('a', VoteDirection::Up),
            ('a', VoteDirection::Up),
            ('a', VoteDirection::Down),
            ('b', VoteDirection::Down),
        ] {
            let state = if voter == 'a' { &mut a } else { &mut b };
            let step = transition(*state, dir);
            *state = step.next;
            up += step.delta.upvotes;
            down += step.delta.downvotes;
        }

        assert_eq!(a, VoteState::Down);
        assert_eq!(b, VoteState::Down);
        assert_eq!((up, down), (0, 2));
    }

    #[test]
    fn test_optimistic_matches_server_fold() {
        for seq in sequences(5) {
            let mut client = OptimisticVote::new(VoteState::None, 3, 1);
            let mut server = (VoteState::None, 3, 1);
            for &dir in &seq {
                let step = transition(server.0, dir);
                server = (
                    step.next,
                    server.1 + step.delta.upvotes,
                    server.2 + step.delta.downvotes,
                );

                assert!(client.cast(dir).is_some());
                assert_eq!(
                    (client.state(), client.upvotes(), client.downvotes()),
                    server
                );
                client.confirm(server.0, server.1, server.2);
            }
        }
    }

    #[test]
    fn test_optimistic_ignores_clicks_while_pending() {
        let mut vote = OptimisticVote::new(VoteState::None, 0, 0);
        assert!(vote.cast(VoteDirection::Up).is_some());
        assert!(vote.is_pending());
        assert!(vote.cast(VoteDirection::Down).is_none());
        assert_eq!(vote.state(), VoteState::Up);
        assert_eq!(vote.upvotes(), 1);
    }

    #[test]
    fn test_optimistic_revert_restores_snapshot() {
        let mut vote = OptimisticVote::new(VoteState::Up, 4, 2);
        let before = vote.clone();

        vote.cast(VoteDirection::Down);
        assert_eq!(vote.state(), VoteState::Down);
        assert_eq!((vote.upvotes(), vote.downvotes()), (3, 3));
        assert_eq!(vote.score(), 0);

        vote.revert();
        assert_eq!(vote, before);
        assert!(!vote.is_pending());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&VoteDirection::Down).ok().as_deref(),
            Some("\"down\"")
        );
        assert_eq!(
            serde_json::to_string(&VoteAction::Removed).ok().as_deref(),
            Some("\"removed\"")
        );
        assert_eq!(VoteState::from(VoteDirection::Up).direction(), Some(VoteDirection::Up));
    }
}
