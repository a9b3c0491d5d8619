use crate::{
    api::{Comment, CommentId},
    forest::{capped_depth, capped_parent_level},
    CommentNode, Forest, ReactionKind, ReactionState, Transition,
};

/// Where a reply to some comment actually lands
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placement {
    /// Effective parent, to be sent to the backend as the new comment's parent
    pub parent: CommentId,
    pub depth: usize,
    path: Vec<usize>,
}

impl Forest {
    pub fn placement_for(&self, target: &CommentId, max_depth: usize) -> Option<Placement> {
        let mut path = self.locate(target)?;
        let depth = capped_depth(path.len(), max_depth);
        path.truncate(capped_parent_level(path.len(), max_depth) + 1);
        let parent = self.node_at(&path)?.id.clone();
        Some(Placement {
            parent,
            depth,
            path,
        })
    }

    /// Grafts `comment` as the newest reply to `target`, or under `target`'s ancestor
    /// at `max_depth` if `target` is already at the maximum depth.
    ///
    /// The comment's `parent_comment_id` is set to the effective parent. Returns an
    /// unchanged forest if `target` is not there.
    pub fn insert_reply(&self, target: &CommentId, comment: Comment, max_depth: usize) -> Forest {
        let Some(placement) = self.placement_for(target, max_depth) else {
            tracing::debug!(reply_to = %target, "reply target not in the forest, not inserting");
            return self.clone();
        };
        self.insert_at(placement, comment)
    }

    pub(crate) fn insert_at(&self, placement: Placement, mut comment: Comment) -> Forest {
        comment.parent_comment_id = Some(placement.parent);
        let mut res = self.clone();
        if let Some(parent) = res.node_at_mut(&placement.path) {
            parent
                .children
                .push_back(CommentNode::new(comment, placement.depth));
        }
        res
    }

    /// Appends a new top-level comment
    pub fn insert_root(&self, mut comment: Comment) -> Forest {
        comment.parent_comment_id = None;
        let mut res = self.clone();
        res.roots.push_back(CommentNode::new(comment, 0));
        res
    }

    /// Removes `id` along with all its replies
    pub fn remove(&self, id: &CommentId) -> Forest {
        let mut res = self.clone();
        let Some(mut path) = self.locate(id) else {
            return res;
        };
        let Some(last) = path.pop() else {
            return res;
        };
        let siblings = match path.is_empty() {
            true => Some(&mut res.roots),
            false => res.node_at_mut(&path).map(|p| &mut p.children),
        };
        if let Some(siblings) = siblings {
            siblings.remove(last);
        }
        res
    }

    pub fn update_content(&self, id: &CommentId, content: String) -> Forest {
        self.update(id, |n| n.content = content)
            .unwrap_or_else(|| self.clone())
    }

    /// Swaps the data of node `old` for `comment`, keeping the node's place in the tree,
    /// its depth, its replies and its materials
    pub fn replace_node(&self, old: &CommentId, comment: Comment) -> Forest {
        self.update(old, |n| n.replace_data(comment))
            .unwrap_or_else(|| self.clone())
    }

    /// Applies the viewer clicking `want` on comment `id`
    pub fn react(&self, id: &CommentId, want: ReactionKind) -> Option<(Forest, Transition)> {
        let mut transition = None;
        let res = self.update(id, |n| {
            let t = n.reactions.transition(want);
            n.reactions = t.next;
            transition = Some(t);
        })?;
        Some((res, transition?))
    }

    pub fn restore_reaction(&self, id: &CommentId, snapshot: ReactionState) -> Forest {
        self.update(id, |n| n.reactions = snapshot)
            .unwrap_or_else(|| self.clone())
    }
}
