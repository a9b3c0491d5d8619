use std::fmt;

use crate::{Author, MaterialId, Reaction, Time};

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> CommentId {
        CommentId(String::from(s))
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A comment as the backend hands it out: flat, pointing at its parent by id
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author: Author,
    pub created_at: Time,
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,

    #[serde(default)]
    pub positive_reaction_count: u32,
    #[serde(default)]
    pub negative_reaction_count: u32,

    /// `None` means the backend did not say (eg. anonymous viewer)
    #[serde(default)]
    pub is_positive_reacted: Option<bool>,
    #[serde(default)]
    pub is_negative_reacted: Option<bool>,

    #[serde(default)]
    pub material_ids: Vec<MaterialId>,
}

impl Comment {
    pub fn viewer_reaction(&self) -> Reaction {
        Reaction::from_flags(self.is_positive_reacted, self.is_negative_reacted)
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.id.0)?;
        crate::validate_content(&self.content)
    }
}
