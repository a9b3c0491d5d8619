use crate::{api::CommentId, CommentNode, Forest};

impl Forest {
    /// Depth-first search for `id`
    pub fn find(&self, id: &CommentId) -> Option<&CommentNode> {
        self.walk().find(|n| n.id == *id)
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.find(id).is_some()
    }

    /// Nodes from a root down to and including `id`, as laid out in the forest (so a
    /// flattened comment's path goes through its effective parent)
    pub fn path_from_root(&self, id: &CommentId) -> Option<Vec<&CommentNode>> {
        let path = self.locate(id)?;
        let mut res = Vec::with_capacity(path.len());
        let mut level = &self.roots;
        for i in path {
            let node = level.get(i)?;
            res.push(node);
            level = &node.children;
        }
        Some(res)
    }

    /// Total number of comments, at any depth
    pub fn count_all(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_size()).sum()
    }

    /// Number of comments in the subtree rooted at `id`, itself included
    pub fn subtree_size(&self, id: &CommentId) -> Option<usize> {
        self.find(id).map(|n| n.subtree_size())
    }
}
