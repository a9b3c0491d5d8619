use std::collections::{HashMap, HashSet};

use crate::{
    api::{AttachedMaterial, CommentId, Material},
    CommentNode, Forest,
};

/// Groups the backend's attachment listing by comment, keeping the listing order
pub fn materials_by_comment(
    listing: impl IntoIterator<Item = AttachedMaterial>,
) -> HashMap<CommentId, Vec<Material>> {
    let mut res = HashMap::<CommentId, Vec<Material>>::new();
    for a in listing {
        res.entry(a.comment_id).or_default().push(a.material);
    }
    res
}

impl Forest {
    /// Appends to every node the materials listed for it. Existing materials are kept
    /// and listed materials a node already has are skipped, so this can run again with
    /// the full listing when more uploads complete.
    pub fn attach_materials(&self, materials: &HashMap<CommentId, Vec<Material>>) -> Forest {
        if materials.is_empty() {
            return self.clone();
        }
        let mut res = self.clone();
        let mut stack: Vec<&mut im::Vector<CommentNode>> = vec![&mut res.roots];
        while let Some(level) = stack.pop() {
            for node in level.iter_mut() {
                if let Some(m) = materials.get(&node.id) {
                    let mut known = node
                        .materials
                        .iter()
                        .map(|m| m.id.clone())
                        .collect::<HashSet<_>>();
                    for m in m {
                        if known.insert(m.id.clone()) {
                            node.materials.push_back(m.clone());
                        }
                    }
                }
                if !node.children.is_empty() {
                    stack.push(&mut node.children);
                }
            }
        }
        res
    }
}
