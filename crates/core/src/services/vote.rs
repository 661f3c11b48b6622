//! Vote service.

use ratenextdoor_common::{AppResult, IdGenerator, VoteDirection};
use ratenextdoor_db::repositories::{ForumVoteRepository, VoteOutcome};

use crate::Actor;

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: ForumVoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: ForumVoteRepository) -> Self {
        Self {
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast, flip, or withdraw the actor's vote on a post or reply.
    ///
    /// Voting the same direction twice withdraws the vote. The returned
    /// counters are the committed values the client should reconcile to.
    pub async fn cast(
        &self,
        actor: &Actor,
        post_id: &str,
        direction: VoteDirection,
    ) -> AppResult<VoteOutcome> {
        self.vote_repo
            .cast_vote(self.id_gen.generate(), &actor.user_id, post_id, direction)
            .await
    }
}
