mod config;
pub use config::{ThreadConfig, DEFAULT_MAX_DEPTH};

mod discussion;
pub use discussion::{Discussion, ReactionTicket, ReplyTicket};

mod error;
pub use error::ThreadError;

mod forest;
pub use forest::{Forest, Walk};

mod insert;
pub use insert::Placement;

mod lookup;

mod materials;
pub use materials::materials_by_comment;

mod node;
pub use node::CommentNode;

mod reaction;
pub use reaction::{ReactionKind, ReactionRequest, ReactionState, Transition};

#[cfg(test)]
mod fuzz;


pub mod api {
    pub use agora_api::*;
}
