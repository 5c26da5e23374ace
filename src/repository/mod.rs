//! Storage access for clubs, memberships, likes and board posts.

use crate::models::{Board, Club, ClubRow, MembershipRole, SearchCriteria, User};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryClubRepository;
pub use postgres::PgClubRepository;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to check out a database connection: {0}")]
    Pool(String),
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error("storage is unavailable")]
    Unavailable,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Mutations return the number of affected rows; 0 means the pair was
/// already in the requested state.
#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn search(&self, criteria: &SearchCriteria) -> StorageResult<Vec<Club>>;

    async fn get_club(&self, club_id: i32) -> StorageResult<Option<ClubRow>>;

    async fn count_members(&self, club_id: i32) -> StorageResult<i64>;

    async fn count_likes(&self, club_id: i32) -> StorageResult<i64>;

    async fn membership_role(
        &self,
        user_id: &str,
        club_id: i32,
    ) -> StorageResult<Option<MembershipRole>>;

    async fn has_like(&self, user_id: &str, club_id: i32) -> StorageResult<bool>;

    async fn list_members(&self, club_id: i32) -> StorageResult<Vec<User>>;

    async fn is_joined(&self, user_id: &str, club_id: i32) -> StorageResult<bool>;

    async fn insert_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize>;

    async fn delete_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize>;

    async fn insert_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize>;

    async fn delete_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize>;

    /// Newest post first.
    async fn list_board_posts(&self, club_id: i32) -> StorageResult<Vec<Board>>;
}

pub type DynClubRepository = Arc<dyn ClubRepository>;
