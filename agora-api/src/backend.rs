use async_trait::async_trait;

use crate::{AttachedMaterial, Comment, CommentId, Error, PostId, ReactionTarget};

/// Everything the discussion engine needs from the forum backend
#[async_trait]
pub trait Backend {
    async fn fetch_comments(&mut self, post: &PostId) -> Result<Vec<Comment>, Error>;
    async fn fetch_materials(&mut self, post: &PostId) -> Result<Vec<AttachedMaterial>, Error>;

    /// `parent` is the effective (depth-capped) parent, not necessarily the comment the
    /// user clicked "reply" on
    async fn create_comment(
        &mut self,
        post: &PostId,
        content: String,
        parent: Option<CommentId>,
    ) -> Result<Comment, Error>;
    async fn edit_comment(&mut self, comment: &CommentId, content: String)
        -> Result<Comment, Error>;
    async fn delete_comment(&mut self, comment: &CommentId) -> Result<(), Error>;

    async fn react(&mut self, target: &ReactionTarget, is_positive: bool) -> Result<(), Error>;
    async fn clear_reaction(&mut self, target: &ReactionTarget) -> Result<(), Error>;
}
