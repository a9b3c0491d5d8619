use crate::{CommentId, PostId};

/// The viewer's own reaction on a post or comment
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reaction {
    #[default]
    None,
    Positive,
    Negative,
}

impl Reaction {
    /// Folds the backend's `isPositiveReacted` / `isNegativeReacted` pair, where `null`
    /// means unknown, into a single value
    pub fn from_flags(positive: Option<bool>, negative: Option<bool>) -> Reaction {
        match (positive.unwrap_or(false), negative.unwrap_or(false)) {
            (true, true) => {
                tracing::warn!("backend reported both a positive and a negative reaction");
                Reaction::Positive
            }
            (true, false) => Reaction::Positive,
            (false, true) => Reaction::Negative,
            (false, false) => Reaction::None,
        }
    }

    pub fn to_flags(self) -> (Option<bool>, Option<bool>) {
        match self {
            Reaction::None => (Some(false), Some(false)),
            Reaction::Positive => (Some(true), Some(false)),
            Reaction::Negative => (Some(false), Some(true)),
        }
    }
}

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}
