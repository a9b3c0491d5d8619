use crate::api::Reaction;

/// What the viewer clicked
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReactionKind {
    Positive,
    Negative,
}

/// The backend call that makes the server agree with an optimistic transition.
/// Both calls are idempotent on the server side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReactionRequest {
    React { is_positive: bool },
    Clear,
}

/// Viewer reaction plus the aggregate counters of one post or comment
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ReactionState {
    pub reaction: Reaction,
    pub positive: u32,
    pub negative: u32,
}

/// Result of applying one click: the state to show now, the request to send, and the
/// state to put back if that request fails
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transition {
    pub next: ReactionState,
    pub request: ReactionRequest,
    pub previous: ReactionState,
}

impl ReactionState {
    pub fn new(reaction: Reaction, positive: u32, negative: u32) -> ReactionState {
        ReactionState {
            reaction,
            positive,
            negative,
        }
    }

    pub fn from_comment(c: &crate::api::Comment) -> ReactionState {
        ReactionState::new(
            c.viewer_reaction(),
            c.positive_reaction_count,
            c.negative_reaction_count,
        )
    }

    pub fn total(&self) -> u64 {
        u64::from(self.positive) + u64::from(self.negative)
    }

    pub fn transition(self, want: ReactionKind) -> Transition {
        let mut next = self;
        let request = match (self.reaction, want) {
            (Reaction::None, ReactionKind::Positive) => {
                next.reaction = Reaction::Positive;
                next.positive = next.positive.saturating_add(1);
                ReactionRequest::React { is_positive: true }
            }
            (Reaction::None, ReactionKind::Negative) => {
                next.reaction = Reaction::Negative;
                next.negative = next.negative.saturating_add(1);
                ReactionRequest::React { is_positive: false }
            }
            (Reaction::Positive, ReactionKind::Positive) => {
                next.reaction = Reaction::None;
                next.positive = decrement(next.positive, "positive");
                ReactionRequest::Clear
            }
            (Reaction::Positive, ReactionKind::Negative) => {
                next.reaction = Reaction::Negative;
                next.positive = decrement(next.positive, "positive");
                next.negative = next.negative.saturating_add(1);
                ReactionRequest::React { is_positive: false }
            }
            (Reaction::Negative, ReactionKind::Negative) => {
                next.reaction = Reaction::None;
                next.negative = decrement(next.negative, "negative");
                ReactionRequest::Clear
            }
            (Reaction::Negative, ReactionKind::Positive) => {
                next.reaction = Reaction::Positive;
                next.negative = decrement(next.negative, "negative");
                next.positive = next.positive.saturating_add(1);
                ReactionRequest::React { is_positive: true }
            }
        };
        Transition {
            next,
            request,
            previous: self,
        }
    }
}

// The viewer's own reaction is part of the count, so this only underflows when the
// backend sent inconsistent data.
fn decrement(count: u32, which: &str) -> u32 {
    if count == 0 {
        tracing::warn!(which, "reaction counter would go below zero");
    }
    count.saturating_sub(1)
}
