use std::collections::{BTreeMap, HashSet};

use agora_client::{
    api::{
        self, AttachedMaterial, Author, Backend, Comment, CommentId, Error, PostId, Reaction,
        ReactionTarget, Time, UserId,
    },
    ReactionState,
};
use async_trait::async_trait;
use chrono::TimeZone;

/// In-memory forum backend, acting on behalf of one viewer
pub struct MockServer {
    viewer: Author,
    clock: Time,
    next_id: u64,
    posts: BTreeMap<PostId, DbPost>,
    failures: Vec<Error>,
    calls: usize,
}

#[derive(Debug, Default)]
struct DbPost {
    comments: BTreeMap<CommentId, DbComment>,
    materials: Vec<AttachedMaterial>,
    reactions: Reactions,
}

#[derive(Debug)]
struct DbComment {
    // Reaction-related fields are recomputed from `reactions` on every read
    comment: Comment,
    reactions: Reactions,
}

#[derive(Debug, Default)]
struct Reactions {
    // Reactions of users this mock does not know about
    base_positive: u32,
    base_negative: u32,
    by_user: BTreeMap<UserId, bool>,
}

impl Reactions {
    fn state_for(&self, user: &UserId) -> ReactionState {
        let positive = self.by_user.values().filter(|p| **p).count();
        let negative = self.by_user.len() - positive;
        let reaction = match self.by_user.get(user) {
            None => Reaction::None,
            Some(true) => Reaction::Positive,
            Some(false) => Reaction::Negative,
        };
        ReactionState::new(
            reaction,
            self.base_positive + positive as u32,
            self.base_negative + negative as u32,
        )
    }
}

impl MockServer {
    pub fn new(viewer: Author) -> MockServer {
        MockServer {
            viewer,
            clock: chrono::Utc
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .single()
                .unwrap_or_default(),
            next_id: 0,
            posts: BTreeMap::new(),
            failures: Vec::new(),
            calls: 0,
        }
    }

    pub fn viewer(&self) -> &Author {
        &self.viewer
    }

    pub fn create_post(&mut self, post: PostId) {
        self.posts.entry(post).or_default();
    }

    /// Makes the next backend calls fail with `err`, one call per entry, in order
    pub fn fail_next(&mut self, err: Error) {
        self.failures.insert(0, err);
    }

    /// Number of backend calls served so far, failed ones included
    pub fn test_num_calls(&self) -> usize {
        self.calls
    }

    /// Stores `c` as-is, its reaction counts being attributed to unknown users. The
    /// post is created if needed.
    pub fn test_add_comment(&mut self, post: &PostId, c: Comment) {
        let reactions = Reactions {
            base_positive: c.positive_reaction_count,
            base_negative: c.negative_reaction_count,
            by_user: BTreeMap::new(),
        };
        self.posts
            .entry(post.clone())
            .or_default()
            .comments
            .insert(c.id.clone(), DbComment {
                comment: c,
                reactions,
            });
    }

    pub fn test_add_material(&mut self, post: &PostId, m: AttachedMaterial) {
        self.posts.entry(post.clone()).or_default().materials.push(m);
    }

    pub fn test_react_as(
        &mut self,
        user: UserId,
        target: &ReactionTarget,
        is_positive: bool,
    ) -> Result<(), Error> {
        self.reactions_mut(target)?.by_user.insert(user, is_positive);
        Ok(())
    }

    /// What the viewer would see for `target` after a reload
    pub fn reaction_state(&self, target: &ReactionTarget) -> Result<ReactionState, Error> {
        let reactions = match target {
            ReactionTarget::Post(p) => &self.post(p)?.reactions,
            ReactionTarget::Comment(c) => &self.comment(c)?.1.reactions,
        };
        Ok(reactions.state_for(&self.viewer.id))
    }

    fn begin_call(&mut self, what: &str) -> Result<(), Error> {
        self.calls += 1;
        match self.failures.pop() {
            Some(err) => {
                tracing::debug!(call = what, error = %err, "mock backend failing call");
                Err(err)
            }
            None => {
                tracing::trace!(call = what, "mock backend call");
                Ok(())
            }
        }
    }

    fn tick(&mut self) -> Time {
        self.clock += chrono::Duration::minutes(1);
        self.clock
    }

    fn post(&self, post: &PostId) -> Result<&DbPost, Error> {
        self.posts
            .get(post)
            .ok_or_else(|| Error::NotFound(format!("post {post}")))
    }

    fn comment(&self, id: &CommentId) -> Result<(&PostId, &DbComment), Error> {
        self.posts
            .iter()
            .find_map(|(p, db)| db.comments.get(id).map(|c| (p, c)))
            .ok_or_else(|| Error::NotFound(format!("comment {id}")))
    }

    fn comment_mut(&mut self, id: &CommentId) -> Result<&mut DbComment, Error> {
        self.posts
            .values_mut()
            .find_map(|db| db.comments.get_mut(id))
            .ok_or_else(|| Error::NotFound(format!("comment {id}")))
    }

    fn reactions_mut(&mut self, target: &ReactionTarget) -> Result<&mut Reactions, Error> {
        match target {
            ReactionTarget::Post(p) => self
                .posts
                .get_mut(p)
                .map(|db| &mut db.reactions)
                .ok_or_else(|| Error::NotFound(format!("post {p}"))),
            ReactionTarget::Comment(c) => Ok(&mut self.comment_mut(c)?.reactions),
        }
    }

    fn check_author(&self, id: &CommentId) -> Result<(), Error> {
        match self.comment(id)?.1.comment.author.id == self.viewer.id {
            true => Ok(()),
            false => Err(Error::PermissionDenied),
        }
    }

    fn render(&self, c: &DbComment) -> Comment {
        let state = c.reactions.state_for(&self.viewer.id);
        let (is_positive_reacted, is_negative_reacted) = state.reaction.to_flags();
        Comment {
            positive_reaction_count: state.positive,
            negative_reaction_count: state.negative,
            is_positive_reacted,
            is_negative_reacted,
            ..c.comment.clone()
        }
    }
}

#[async_trait]
impl Backend for MockServer {
    async fn fetch_comments(&mut self, post: &PostId) -> Result<Vec<Comment>, Error> {
        self.begin_call("fetch_comments")?;
        let db = self.post(post)?;
        Ok(db.comments.values().map(|c| self.render(c)).collect())
    }

    async fn fetch_materials(&mut self, post: &PostId) -> Result<Vec<AttachedMaterial>, Error> {
        self.begin_call("fetch_materials")?;
        Ok(self.post(post)?.materials.clone())
    }

    async fn create_comment(
        &mut self,
        post: &PostId,
        content: String,
        parent: Option<CommentId>,
    ) -> Result<Comment, Error> {
        self.begin_call("create_comment")?;
        api::validate_content(&content)?;
        let db = self.post(post)?;
        if let Some(p) = &parent {
            if !db.comments.contains_key(p) {
                return Err(Error::NotFound(format!("comment {p}")));
            }
        }
        self.next_id += 1;
        let comment = Comment {
            id: CommentId(format!("c{}", self.next_id)),
            content,
            author: self.viewer.clone(),
            created_at: self.tick(),
            parent_comment_id: parent,
            positive_reaction_count: 0,
            negative_reaction_count: 0,
            is_positive_reacted: Some(false),
            is_negative_reacted: Some(false),
            material_ids: Vec::new(),
        };
        tracing::debug!(id = %comment.id, %post, "mock backend created comment");
        self.test_add_comment(post, comment.clone());
        Ok(comment)
    }

    async fn edit_comment(
        &mut self,
        comment: &CommentId,
        content: String,
    ) -> Result<Comment, Error> {
        self.begin_call("edit_comment")?;
        api::validate_content(&content)?;
        self.check_author(comment)?;
        let db = self.comment_mut(comment)?;
        db.comment.content = content;
        let (_, db) = self.comment(comment)?;
        Ok(self.render(db))
    }

    async fn delete_comment(&mut self, comment: &CommentId) -> Result<(), Error> {
        self.begin_call("delete_comment")?;
        self.check_author(comment)?;
        let post = self.comment(comment)?.0.clone();
        let Some(db) = self.posts.get_mut(&post) else {
            return Err(Error::NotFound(format!("post {post}")));
        };

        // Replies go away along with their parent
        let mut deleted = HashSet::from([comment.clone()]);
        loop {
            let before = deleted.len();
            for c in db.comments.values() {
                if let Some(p) = &c.comment.parent_comment_id {
                    if deleted.contains(p) {
                        deleted.insert(c.comment.id.clone());
                    }
                }
            }
            if deleted.len() == before {
                break;
            }
        }
        db.comments.retain(|id, _| !deleted.contains(id));
        db.materials.retain(|m| !deleted.contains(&m.comment_id));
        tracing::debug!(id = %comment, deleted = deleted.len(), "mock backend deleted comment");
        Ok(())
    }

    async fn react(&mut self, target: &ReactionTarget, is_positive: bool) -> Result<(), Error> {
        self.begin_call("react")?;
        let user = self.viewer.id.clone();
        self.reactions_mut(target)?.by_user.insert(user, is_positive);
        Ok(())
    }

    async fn clear_reaction(&mut self, target: &ReactionTarget) -> Result<(), Error> {
        self.begin_call("clear_reaction")?;
        let user = self.viewer.id.clone();
        self.reactions_mut(target)?.by_user.remove(&user);
        Ok(())
    }
}
