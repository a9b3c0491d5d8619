pub const DEFAULT_MAX_DEPTH: usize = 2;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadConfig {
    /// Deepest indentation level a comment can be rendered at. Replies to comments
    /// sitting at this level are flattened onto it.
    pub max_depth: usize,
}

impl ThreadConfig {
    pub fn with_max_depth(max_depth: usize) -> ThreadConfig {
        ThreadConfig { max_depth }
    }
}

impl Default for ThreadConfig {
    fn default() -> ThreadConfig {
        ThreadConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
