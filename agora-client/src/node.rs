use crate::{
    api::{Author, Comment, CommentId, Material, MaterialId, Time},
    ReactionState,
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: CommentId,
    pub content: String,
    pub author: Author,
    pub created_at: Time,

    /// Parent as recorded by the backend, which can be deeper than the node this one
    /// is rendered under
    pub parent_comment_id: Option<CommentId>,

    pub reactions: ReactionState,
    pub material_ids: Vec<MaterialId>,

    /// Indentation level, never above the configured maximum depth
    pub depth: usize,

    /// Replies, oldest first
    pub children: im::Vector<CommentNode>,

    pub materials: im::Vector<Material>,
}

impl CommentNode {
    pub fn new(c: Comment, depth: usize) -> CommentNode {
        CommentNode {
            reactions: ReactionState::from_comment(&c),
            id: c.id,
            content: c.content,
            author: c.author,
            created_at: c.created_at,
            parent_comment_id: c.parent_comment_id,
            material_ids: c.material_ids,
            depth,
            children: im::Vector::new(),
            materials: im::Vector::new(),
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_size(&self) -> usize {
        let mut res = 0;
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            res += 1;
            stack.extend(n.children.iter());
        }
        res
    }

    /// Overwrites the server-owned fields with `c`, keeping the position in the tree
    pub(crate) fn replace_data(&mut self, c: Comment) {
        self.reactions = ReactionState::from_comment(&c);
        self.id = c.id;
        self.content = c.content;
        self.author = c.author;
        self.created_at = c.created_at;
        self.parent_comment_id = c.parent_comment_id;
        self.material_ids = c.material_ids;
    }
}
