use crate::CommentId;

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct MaterialId(pub String);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialKind {
    Image,
    Document,
    Video,
    Link,
    Other,
}

/// An uploaded file attached to a comment
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub url: String,
    pub title: String,
    pub kind: MaterialKind,
}

/// One entry of the backend's attachment listing for a post
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedMaterial {
    pub comment_id: CommentId,
    pub material: Material,
}
