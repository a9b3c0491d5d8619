use std::{cmp, collections::HashMap};

use crate::{
    api::{Comment, CommentId},
    CommentNode,
};

/// All the comment trees of one post, roots ordered oldest first.
///
/// A `Forest` is a value: every operation that changes it returns a new `Forest` and
/// leaves `self` untouched. Clones are cheap, and an update only copies the nodes on
/// the path from the root to the modified node, so keeping an older forest around to
/// roll back to costs next to nothing.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Forest {
    pub(crate) roots: im::Vector<CommentNode>,
}

/// Given the number of ancestors a comment would have, returns the level of the
/// ancestor it actually hangs under. Shared by the builder and reply insertion so
/// that both agree on where a deep reply lands.
pub(crate) fn capped_parent_level(ancestors: usize, max_depth: usize) -> usize {
    cmp::min(ancestors - 1, max_depth)
}

pub(crate) fn capped_depth(ancestors: usize, max_depth: usize) -> usize {
    cmp::min(ancestors, max_depth)
}

impl Forest {
    pub fn new() -> Forest {
        Forest::default()
    }

    /// Builds the forest from the backend's flat comment listing, in any order.
    ///
    /// Comments nested deeper than `max_depth` are re-parented onto their ancestor at
    /// `max_depth`. Comments whose parent is unknown become roots, and so does the
    /// oldest comment of any parent cycle. Nothing is dropped except duplicate ids.
    pub fn build(comments: impl IntoIterator<Item = Comment>, max_depth: usize) -> Forest {
        let mut comments = comments.into_iter().collect::<Vec<_>>();
        comments.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        // From here on, comments are referred to by their index in creation order
        let mut index = HashMap::with_capacity(comments.len());
        let mut slots = Vec::with_capacity(comments.len());
        for c in comments {
            if index.contains_key(&c.id) {
                tracing::warn!(id = %c.id, "duplicate comment id in listing, keeping the oldest");
                continue;
            }
            if let Err(err) = c.validate() {
                tracing::warn!(id = %c.id, error = %err, "invalid comment in listing, keeping it");
            }
            index.insert(c.id.clone(), slots.len());
            slots.push(Some(c));
        }
        let n = slots.len();

        let mut parent = slots
            .iter()
            .flatten()
            .map(|c| {
                let p = c.parent_comment_id.as_ref()?;
                let res = index.get(p).copied();
                if res.is_none() {
                    tracing::warn!(id = %c.id, parent = %p, "parent comment not found, treating as root");
                }
                res
            })
            .collect::<Vec<_>>();
        break_cycles(&mut parent);
        let depth = nominal_depths(&parent);

        // Walk down by increasing depth, so that ancestors are resolved before their
        // descendants
        let mut by_depth = (0..n).collect::<Vec<_>>();
        by_depth.sort_by_key(|&i| depth[i]);
        let mut at_max_depth = vec![None; n];
        let mut effective_parent = vec![None; n];
        for &i in &by_depth {
            let d = depth[i];
            if d == max_depth {
                at_max_depth[i] = Some(i);
            }
            let Some(p) = parent[i] else { continue };
            if d > max_depth {
                at_max_depth[i] = at_max_depth[p];
            }
            effective_parent[i] = match capped_parent_level(d, max_depth) == d - 1 {
                true => Some(p),
                false => at_max_depth[p],
            };
        }

        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for i in 0..n {
            match effective_parent[i] {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }

        // Assemble bottom-up. Indices were pushed in creation order, so every children
        // list is already sorted.
        let mut built: Vec<Option<CommentNode>> = vec![None; n];
        for &i in by_depth.iter().rev() {
            let Some(comment) = slots[i].take() else { continue };
            let mut node = CommentNode::new(comment, capped_depth(depth[i], max_depth));
            node.children = children[i]
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[i] = Some(node);
        }
        Forest {
            roots: roots.iter().filter_map(|&r| built[r].take()).collect(),
        }
    }

    pub fn roots(&self) -> &im::Vector<CommentNode> {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order iteration over every node
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.roots.iter()],
        }
    }

    /// Index path from the roots down to `id`
    pub(crate) fn locate(&self, id: &CommentId) -> Option<Vec<usize>> {
        let mut stack = vec![self.roots.iter().enumerate()];
        let mut path = Vec::new();
        while let Some(level) = stack.last_mut() {
            match level.next() {
                Some((i, node)) => {
                    path.truncate(stack.len() - 1);
                    path.push(i);
                    if node.id == *id {
                        return Some(path);
                    }
                    stack.push(node.children.iter().enumerate());
                }
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    pub(crate) fn node_at(&self, path: &[usize]) -> Option<&CommentNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &i in rest {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    // Only the chunks along `path` get copied
    pub(crate) fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut CommentNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for &i in rest {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Returns a new forest where `f` has been applied to node `id`, or `None` if there
    /// is no such node
    pub(crate) fn update(
        &self,
        id: &CommentId,
        f: impl FnOnce(&mut CommentNode),
    ) -> Option<Forest> {
        let path = self.locate(id)?;
        let mut res = self.clone();
        f(res.node_at_mut(&path)?);
        Some(res)
    }
}

pub struct Walk<'a> {
    stack: Vec<im::vector::Iter<'a, CommentNode>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<&'a CommentNode> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    self.stack.push(node.children.iter());
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Detaches the oldest member of every parent cycle, making it a root.
///
/// `parent` is indexed in creation order, which is what makes "oldest" well-defined
/// and the result independent of the listing order. Every comment is walked over
/// once, as later walks stop at the first comment an earlier walk went through.
fn break_cycles(parent: &mut [Option<usize>]) {
    // Index of the walk that first went through each comment
    let mut walked_by = vec![None; parent.len()];
    let mut walked = Vec::new();
    for i in 0..parent.len() {
        if walked_by[i].is_some() {
            continue;
        }
        walked.clear();
        let mut cur = Some(i);
        while let Some(c) = cur {
            match walked_by[c] {
                None => {
                    walked_by[c] = Some(i);
                    walked.push(c);
                    cur = parent[c];
                }
                Some(w) if w == i => {
                    let start = walked.iter().rposition(|&w| w == c).unwrap_or(0);
                    if let Some(&oldest) = walked[start..].iter().min() {
                        tracing::warn!(
                            index = oldest,
                            "cycle in comment parents, treating as root"
                        );
                        parent[oldest] = None;
                    }
                    break;
                }
                // Joins a path an earlier walk already made acyclic
                Some(_) => break,
            }
        }
    }
}

/// Distance of every comment to its root, following the (acyclic) parent links
fn nominal_depths(parent: &[Option<usize>]) -> Vec<usize> {
    let mut depth: Vec<Option<usize>> = vec![None; parent.len()];
    let mut unresolved = Vec::new();
    for i in 0..parent.len() {
        let mut cur = Some(i);
        let mut known = None;
        while let Some(c) = cur {
            if let Some(d) = depth[c] {
                known = Some(d);
                break;
            }
            unresolved.push(c);
            cur = parent[c];
        }
        let mut d = known.map_or(0, |d| d + 1);
        while let Some(c) = unresolved.pop() {
            depth[c] = Some(d);
            d += 1;
        }
    }
    depth.into_iter().map(|d| d.unwrap_or(0)).collect()
}
