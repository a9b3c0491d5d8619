use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod backend;
pub use backend::Backend;

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod material;
pub use material::{AttachedMaterial, Material, MaterialId, MaterialKind};

mod post;
pub use post::PostId;

mod reaction;
pub use reaction::{Reaction, ReactionTarget};

mod user;
pub use user::{Author, UserId};

pub const MAX_CONTENT_LEN: usize = 10_000;

// The `validate_*` functions check what the backend would reject anyway, so that the
// client can refuse a submission before inserting anything optimistically.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::InvalidContent(String::from("content is empty")));
    }
    if s.chars().count() > MAX_CONTENT_LEN {
        return Err(Error::InvalidContent(format!(
            "content is longer than {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}
