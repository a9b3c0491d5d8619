use crate::api::{self, CommentId, PostId, ReactionTarget};

#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    #[error("comment {0} is not in the discussion")]
    NotFound(CommentId),

    #[error("this discussion is not about post {0}")]
    WrongPost(PostId),

    #[error("a reaction on {0:?} is already being submitted")]
    ReactionInFlight(ReactionTarget),

    #[error("comment {0} has not been confirmed by the server yet")]
    ReplyNotConfirmed(CommentId),

    #[error(transparent)]
    Api(#[from] api::Error),
}
