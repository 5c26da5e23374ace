use crate::{
    models::{Board, Club, MembershipKey, SearchCriteria, User, UserStatus},
    repository::{DynClubRepository, StorageResult},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    AlreadyMember,
    Joined,
    ServerError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    NotMember,
    Left,
    ServerError,
}

/// Result of a like or dislike. `Failed` covers both "nothing changed" and
/// storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Applied,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    pub user_status: UserStatus,
    pub is_like: u8,
}

#[derive(Clone)]
pub struct ClubService {
    repo: DynClubRepository,
}

impl ClubService {
    pub fn new(repo: DynClubRepository) -> Self {
        Self { repo }
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> StorageResult<Vec<Club>> {
        self.repo.search(criteria).await
    }

    /// `None` when the club does not exist.
    pub async fn detail(&self, key: &MembershipKey) -> StorageResult<Option<ClubDetail>> {
        let Some(row) = self.repo.get_club(key.club_id).await? else {
            return Ok(None);
        };

        let member_num = self.repo.count_members(key.club_id).await?;
        let like_num = self.repo.count_likes(key.club_id).await?;
        let user_status = self.user_status(key).await?;
        let is_like = self.is_like(key).await?;

        Ok(Some(ClubDetail {
            club: Club::from_row(row, member_num, like_num),
            user_status,
            is_like: u8::from(is_like),
        }))
    }

    pub async fn user_status(&self, key: &MembershipKey) -> StorageResult<UserStatus> {
        let role = self
            .repo
            .membership_role(&key.user_id, key.club_id)
            .await?;
        Ok(UserStatus::from(role))
    }

    pub async fn is_like(&self, key: &MembershipKey) -> StorageResult<bool> {
        self.repo.has_like(&key.user_id, key.club_id).await
    }

    pub async fn join(&self, key: &MembershipKey) -> JoinOutcome {
        match self.try_join(key).await {
            Ok(outcome) => {
                tracing::info!(user_id = %key.user_id, club_id = key.club_id, ?outcome, "join");
                outcome
            }
            Err(e) => {
                tracing::error!(user_id = %key.user_id, club_id = key.club_id, error = %e, "join failed");
                JoinOutcome::ServerError
            }
        }
    }

    async fn try_join(&self, key: &MembershipKey) -> StorageResult<JoinOutcome> {
        if self.repo.is_joined(&key.user_id, key.club_id).await? {
            return Ok(JoinOutcome::AlreadyMember);
        }
        // a concurrent join that won the race leaves nothing to insert
        match self.repo.insert_membership(&key.user_id, key.club_id).await? {
            0 => Ok(JoinOutcome::AlreadyMember),
            _ => Ok(JoinOutcome::Joined),
        }
    }

    pub async fn leave(&self, key: &MembershipKey) -> LeaveOutcome {
        match self.try_leave(key).await {
            Ok(outcome) => {
                tracing::info!(user_id = %key.user_id, club_id = key.club_id, ?outcome, "leave");
                outcome
            }
            Err(e) => {
                tracing::error!(user_id = %key.user_id, club_id = key.club_id, error = %e, "leave failed");
                LeaveOutcome::ServerError
            }
        }
    }

    async fn try_leave(&self, key: &MembershipKey) -> StorageResult<LeaveOutcome> {
        if !self.repo.is_joined(&key.user_id, key.club_id).await? {
            return Ok(LeaveOutcome::NotMember);
        }
        match self.repo.delete_membership(&key.user_id, key.club_id).await? {
            0 => Ok(LeaveOutcome::NotMember),
            _ => Ok(LeaveOutcome::Left),
        }
    }

    /// Inserts without an existence check; a repeated like affects no rows
    /// and reports `Failed`.
    pub async fn like(&self, key: &MembershipKey) -> LikeOutcome {
        let result = self.repo.insert_like(&key.user_id, key.club_id).await;
        like_outcome("like", key, result)
    }

    pub async fn dislike(&self, key: &MembershipKey) -> LikeOutcome {
        let result = self.repo.delete_like(&key.user_id, key.club_id).await;
        like_outcome("dislike", key, result)
    }

    /// `None` when the club does not exist; an existing club without posts
    /// yields an empty list.
    pub async fn board_list(&self, club_id: i32) -> StorageResult<Option<Vec<Board>>> {
        if self.repo.get_club(club_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repo.list_board_posts(club_id).await?))
    }

    pub async fn member_list(&self, club_id: i32) -> StorageResult<Option<Vec<User>>> {
        if self.repo.get_club(club_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repo.list_members(club_id).await?))
    }
}

fn like_outcome(action: &str, key: &MembershipKey, result: StorageResult<usize>) -> LikeOutcome {
    match result {
        Ok(0) => {
            tracing::warn!(user_id = %key.user_id, club_id = key.club_id, "{action} changed nothing");
            LikeOutcome::Failed
        }
        Ok(_) => {
            tracing::debug!(user_id = %key.user_id, club_id = key.club_id, "{action}");
            LikeOutcome::Applied
        }
        Err(e) => {
            tracing::error!(user_id = %key.user_id, club_id = key.club_id, error = %e, "{action} failed");
            LikeOutcome::Failed
        }
    }
}
