use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl Error {
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotFound(what) => json!({
                "message": "not found",
                "type": "not-found",
                "what": what,
            }),
            Error::Network(msg) => json!({
                "message": msg,
                "type": "network",
            }),
            Error::InvalidContent(reason) => json!({
                "message": "invalid content",
                "type": "invalid-content",
                "reason": reason,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| -> Option<String> {
            data.get(name).and_then(|v| v.as_str()).map(String::from)
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(field("message").unwrap_or_default()),
                "permission-denied" => Error::PermissionDenied,
                "not-found" => Error::NotFound(
                    field("what").ok_or_else(|| anyhow!("error is a not-found without a what"))?,
                ),
                "network" => Error::Network(field("message").unwrap_or_default()),
                "invalid-content" => Error::InvalidContent(field("reason").ok_or_else(|| {
                    anyhow!("error is an invalid-content without a reason")
                })?),
                "null-byte" => Error::NullByteInString(field("string").ok_or_else(|| {
                    anyhow!("error is a null-byte-in-string without a string")
                })?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
