use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::{
    api::{self, Author, Backend, Comment, CommentId, PostId, ReactionTarget},
    materials_by_comment, Forest, ReactionKind, ReactionRequest, ReactionState, ThreadConfig,
    ThreadError,
};

/// State of the discussion under one post, as shown to one viewer.
///
/// Optimistic operations come in two halves. `begin_*` applies the change locally right
/// away and returns a ticket describing the backend call to make; `settle_*` takes the
/// ticket back along with the outcome of that call. The `async` methods chain both
/// halves around a [`Backend`].
#[derive(Clone, Debug)]
pub struct Discussion {
    post: PostId,
    config: ThreadConfig,
    viewer: Author,
    forest: Forest,
    post_reactions: ReactionState,

    next_generation: u64,
    reactions_in_flight: HashMap<ReactionTarget, PendingReaction>,

    // Provisional ids of the replies inserted locally and not confirmed yet
    replies_in_flight: HashSet<CommentId>,
}

#[derive(Clone, Copy, Debug)]
struct PendingReaction {
    generation: u64,
    snapshot: Option<ReactionState>,
}

#[must_use]
#[derive(Debug)]
pub struct ReactionTicket {
    pub target: ReactionTarget,
    pub request: ReactionRequest,
    generation: u64,
}

#[must_use]
#[derive(Debug)]
pub struct ReplyTicket {
    pub provisional_id: CommentId,
    pub post: PostId,
    pub content: String,

    /// Effective parent to send to the backend
    pub parent: Option<CommentId>,

    inserted: bool,
}

impl Discussion {
    pub fn new(
        post: PostId,
        viewer: Author,
        config: ThreadConfig,
        post_reactions: ReactionState,
    ) -> Discussion {
        Discussion {
            post,
            config,
            viewer,
            forest: Forest::new(),
            post_reactions,
            next_generation: 0,
            reactions_in_flight: HashMap::new(),
            replies_in_flight: HashSet::new(),
        }
    }

    pub fn post(&self) -> &PostId {
        &self.post
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn comment_count(&self) -> usize {
        self.forest.count_all()
    }

    pub fn post_reactions(&self) -> ReactionState {
        self.post_reactions
    }

    pub fn is_reaction_in_flight(&self, target: &ReactionTarget) -> bool {
        self.reactions_in_flight.contains_key(target)
    }

    pub fn is_provisional(&self, id: &CommentId) -> bool {
        self.replies_in_flight.contains(id)
    }

    /// Replaces the whole forest with one rebuilt from `comments`.
    ///
    /// This is authoritative: local changes that were not confirmed yet are lost, and
    /// all outstanding tickets go stale.
    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        if !self.reactions_in_flight.is_empty() || !self.replies_in_flight.is_empty() {
            tracing::debug!(
                reactions = self.reactions_in_flight.len(),
                replies = self.replies_in_flight.len(),
                "refresh discards unconfirmed changes"
            );
        }
        self.reactions_in_flight.clear();
        self.replies_in_flight.clear();
        self.forest = Forest::build(comments, self.config.max_depth);
    }

    /// Merges the backend's attachment listing. Listings can be merged repeatedly, as
    /// uploads complete, since materials a comment already shows are skipped.
    pub fn attach_materials(&mut self, listing: Vec<api::AttachedMaterial>) {
        self.forest = self.forest.attach_materials(&materials_by_comment(listing));
    }

    pub fn begin_reaction(
        &mut self,
        target: ReactionTarget,
        want: ReactionKind,
    ) -> Result<ReactionTicket, ThreadError> {
        if self.reactions_in_flight.contains_key(&target) {
            return Err(ThreadError::ReactionInFlight(target));
        }
        // `None` when there is nothing to show locally, and so nothing to roll back
        let (request, snapshot) = match &target {
            ReactionTarget::Post(p) => {
                if *p != self.post {
                    return Err(ThreadError::WrongPost(p.clone()));
                }
                let t = self.post_reactions.transition(want);
                self.post_reactions = t.next;
                (t.request, Some(t.previous))
            }
            ReactionTarget::Comment(c) => {
                if self.replies_in_flight.contains(c) {
                    return Err(ThreadError::ReplyNotConfirmed(c.clone()));
                }
                match self.forest.react(c, want) {
                    Some((forest, t)) => {
                        self.forest = forest;
                        (t.request, Some(t.previous))
                    }
                    None => {
                        tracing::debug!(
                            comment = %c,
                            "reaction target not in the forest, sending anyway"
                        );
                        let is_positive = want == ReactionKind::Positive;
                        (ReactionRequest::React { is_positive }, None)
                    }
                }
            }
        };
        let generation = self.next_generation;
        self.next_generation += 1;
        self.reactions_in_flight.insert(
            target.clone(),
            PendingReaction {
                generation,
                snapshot,
            },
        );
        tracing::debug!(
            reaction_target = ?target,
            ?want,
            ?request,
            generation,
            "optimistic reaction"
        );
        Ok(ReactionTicket {
            target,
            request,
            generation,
        })
    }

    /// Records the outcome of the backend call for `ticket`. On failure the state from
    /// before the click comes back, unless the ticket went stale meanwhile.
    pub fn settle_reaction(
        &mut self,
        ticket: ReactionTicket,
        outcome: Result<(), api::Error>,
    ) -> Result<(), ThreadError> {
        let current = self
            .reactions_in_flight
            .get(&ticket.target)
            .map_or(false, |p| p.generation == ticket.generation);
        let pending = match current {
            true => self.reactions_in_flight.remove(&ticket.target),
            false => None,
        };
        let Err(err) = outcome else {
            return Ok(());
        };
        match pending {
            None => tracing::debug!(
                reaction_target = ?ticket.target,
                generation = ticket.generation,
                "stale reaction failed, not rolling back"
            ),
            Some(PendingReaction { snapshot: None, .. }) => (),
            Some(PendingReaction {
                snapshot: Some(snapshot),
                ..
            }) => {
                tracing::debug!(reaction_target = ?ticket.target, error = %err, "rolling back reaction");
                match &ticket.target {
                    ReactionTarget::Post(_) => self.post_reactions = snapshot,
                    ReactionTarget::Comment(c) => {
                        self.forest = self.forest.restore_reaction(c, snapshot)
                    }
                }
            }
        }
        Err(ThreadError::Api(err))
    }

    /// Inserts a provisional reply to `target`, or a new top-level comment if `target`
    /// is `None`.
    ///
    /// If `target` is no longer in the forest nothing is inserted, but the ticket is still
    /// returned so that the backend gets to decide.
    pub fn begin_reply(
        &mut self,
        target: Option<&CommentId>,
        content: String,
    ) -> Result<ReplyTicket, ThreadError> {
        api::validate_content(&content)?;
        if let Some(t) = target {
            if self.replies_in_flight.contains(t) {
                return Err(ThreadError::ReplyNotConfirmed(t.clone()));
            }
        }
        let provisional_id = CommentId(format!("local-{}", uuid::Uuid::new_v4()));
        let comment = Comment {
            id: provisional_id.clone(),
            content: content.clone(),
            author: self.viewer.clone(),
            created_at: Utc::now(),
            parent_comment_id: None,
            positive_reaction_count: 0,
            negative_reaction_count: 0,
            is_positive_reacted: None,
            is_negative_reacted: None,
            material_ids: Vec::new(),
        };
        let (parent, inserted) = match target {
            None => {
                self.forest = self.forest.insert_root(comment);
                (None, true)
            }
            Some(t) => match self.forest.placement_for(t, self.config.max_depth) {
                Some(placement) => {
                    let parent = placement.parent.clone();
                    self.forest = self.forest.insert_at(placement, comment);
                    (Some(parent), true)
                }
                None => {
                    tracing::debug!(reply_to = %t, "reply target vanished, sending without local insertion");
                    (Some(t.clone()), false)
                }
            },
        };
        if inserted {
            self.replies_in_flight.insert(provisional_id.clone());
        }
        tracing::debug!(%provisional_id, ?parent, inserted, "optimistic reply");
        Ok(ReplyTicket {
            provisional_id,
            post: self.post.clone(),
            content,
            parent,
            inserted,
        })
    }

    /// Swaps the provisional reply for the comment the backend created, or removes it if
    /// creation failed. Returns the id of the created comment.
    pub fn settle_reply(
        &mut self,
        ticket: ReplyTicket,
        outcome: Result<Comment, api::Error>,
    ) -> Result<CommentId, ThreadError> {
        let current = self.replies_in_flight.remove(&ticket.provisional_id);
        match outcome {
            Ok(comment) => {
                let id = comment.id.clone();
                if ticket.inserted && current {
                    self.forest = self.forest.replace_node(&ticket.provisional_id, comment);
                }
                Ok(id)
            }
            Err(err) => {
                if ticket.inserted && current {
                    tracing::debug!(provisional_id = %ticket.provisional_id, error = %err, "removing failed reply");
                    self.forest = self.forest.remove(&ticket.provisional_id);
                }
                Err(ThreadError::Api(err))
            }
        }
    }

    pub async fn load<B: Backend + ?Sized>(&mut self, backend: &mut B) -> Result<(), ThreadError> {
        let comments = backend.fetch_comments(&self.post).await?;
        tracing::trace!(post = %self.post, comments = comments.len(), "loaded comments");
        self.replace_comments(comments);
        Ok(())
    }

    pub async fn load_materials<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<(), ThreadError> {
        let listing = backend.fetch_materials(&self.post).await?;
        self.attach_materials(listing);
        Ok(())
    }

    /// Reloads comments then their materials
    pub async fn refresh<B: Backend + ?Sized>(&mut self, backend: &mut B) -> Result<(), ThreadError> {
        self.load(backend).await?;
        self.load_materials(backend).await
    }

    pub async fn react<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        target: ReactionTarget,
        want: ReactionKind,
    ) -> Result<(), ThreadError> {
        let ticket = self.begin_reaction(target, want)?;
        let outcome = match ticket.request {
            ReactionRequest::React { is_positive } => backend.react(&ticket.target, is_positive).await,
            ReactionRequest::Clear => backend.clear_reaction(&ticket.target).await,
        };
        self.settle_reaction(ticket, outcome)
    }

    pub async fn reply<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        target: Option<&CommentId>,
        content: String,
    ) -> Result<CommentId, ThreadError> {
        let ticket = self.begin_reply(target, content)?;
        let outcome = backend
            .create_comment(&ticket.post, ticket.content.clone(), ticket.parent.clone())
            .await;
        self.settle_reply(ticket, outcome)
    }

    /// Edits are only shown once the backend accepted them
    pub async fn edit<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: &CommentId,
        content: String,
    ) -> Result<(), ThreadError> {
        api::validate_content(&content)?;
        self.check_confirmed(id)?;
        let edited = backend.edit_comment(id, content).await?;
        self.forest = self.forest.update_content(id, edited.content);
        Ok(())
    }

    /// Deletes `id` and, locally, all of its replies
    pub async fn delete<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: &CommentId,
    ) -> Result<(), ThreadError> {
        self.check_confirmed(id)?;
        backend.delete_comment(id).await?;
        self.forest = self.forest.remove(id);
        Ok(())
    }

    fn check_confirmed(&self, id: &CommentId) -> Result<(), ThreadError> {
        if self.replies_in_flight.contains(id) {
            return Err(ThreadError::ReplyNotConfirmed(id.clone()));
        }
        if !self.forest.contains(id) {
            return Err(ThreadError::NotFound(id.clone()));
        }
        Ok(())
    }
}
