//! In-process store with the same semantics as the PostgreSQL schema: primary
//! keys on (user, club) pairs and foreign keys on users and clubs.

use super::{ClubRepository, StorageError, StorageResult};
use crate::models::{Board, Club, ClubRow, MembershipRole, SearchCriteria, User};
use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

type Pair = (String, i32);

#[derive(Default)]
struct State {
    clubs: BTreeMap<i32, ClubRow>,
    users: BTreeMap<String, User>,
    members: BTreeMap<Pair, MembershipRole>,
    likes: BTreeSet<Pair>,
    boards: Vec<Board>,
}

impl State {
    fn club(&self, row: &ClubRow) -> Club {
        let member_num = self.members.keys().filter(|(_, c)| *c == row.club_id).count();
        let like_num = self.likes.iter().filter(|(_, c)| *c == row.club_id).count();
        Club::from_row(row.clone(), member_num as i64, like_num as i64)
    }

    fn check_references(&self, user_id: &str, club_id: i32) -> StorageResult<()> {
        if !self.clubs.contains_key(&club_id) {
            return Err(foreign_key_violation(format!("club {club_id} does not exist")));
        }
        if !self.users.contains_key(user_id) {
            return Err(foreign_key_violation(format!("user {user_id} does not exist")));
        }
        Ok(())
    }
}

fn foreign_key_violation(message: String) -> StorageError {
    StorageError::Query(DieselError::DatabaseError(
        DatabaseErrorKind::ForeignKeyViolation,
        Box::new(message),
    ))
}

fn matches_criteria(criteria: &SearchCriteria, row: &ClubRow) -> bool {
    if criteria.category().map_or(false, |c| c != row.category) {
        return false;
    }
    if criteria.wide_area().map_or(false, |w| w != row.wide_area) {
        return false;
    }
    if criteria.detail_area().map_or(false, |d| d != row.detail_area) {
        return false;
    }
    match criteria.keyword() {
        Some(keyword) => {
            let keyword = keyword.to_lowercase();
            row.club_name.to_lowercase().contains(&keyword)
                || row.introduction.to_lowercase().contains(&keyword)
        }
        None => true,
    }
}

#[derive(Default)]
pub struct MemoryClubRepository {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryClubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_club(&self, club: ClubRow) {
        self.lock().clubs.insert(club.club_id, club);
    }

    pub fn add_user(&self, user: User) {
        self.lock().users.insert(user.user_id.clone(), user);
    }

    pub fn add_board(&self, board: Board) {
        self.lock().boards.push(board);
    }

    /// Seeds a membership directly, bypassing the join flow.
    pub fn add_membership(&self, user_id: &str, club_id: i32, role: MembershipRole) {
        self.lock()
            .members
            .insert((user_id.to_string(), club_id), role);
    }

    /// While set, every operation fails with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> StorageResult<MutexGuard<'_, State>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl ClubRepository for MemoryClubRepository {
    async fn search(&self, criteria: &SearchCriteria) -> StorageResult<Vec<Club>> {
        let state = self.state()?;
        Ok(state
            .clubs
            .values()
            .filter(|row| matches_criteria(criteria, row))
            .map(|row| state.club(row))
            .collect())
    }

    async fn get_club(&self, club_id: i32) -> StorageResult<Option<ClubRow>> {
        let state = self.state()?;
        Ok(state.clubs.get(&club_id).cloned())
    }

    async fn count_members(&self, club_id: i32) -> StorageResult<i64> {
        let state = self.state()?;
        Ok(state.members.keys().filter(|(_, c)| *c == club_id).count() as i64)
    }

    async fn count_likes(&self, club_id: i32) -> StorageResult<i64> {
        let state = self.state()?;
        Ok(state.likes.iter().filter(|(_, c)| *c == club_id).count() as i64)
    }

    async fn membership_role(
        &self,
        user_id: &str,
        club_id: i32,
    ) -> StorageResult<Option<MembershipRole>> {
        let state = self.state()?;
        Ok(state.members.get(&(user_id.to_string(), club_id)).copied())
    }

    async fn has_like(&self, user_id: &str, club_id: i32) -> StorageResult<bool> {
        let state = self.state()?;
        Ok(state.likes.contains(&(user_id.to_string(), club_id)))
    }

    async fn list_members(&self, club_id: i32) -> StorageResult<Vec<User>> {
        let state = self.state()?;
        let mut members: Vec<(MembershipRole, &User)> = state
            .members
            .iter()
            .filter(|((_, c), _)| *c == club_id)
            .filter_map(|((u, _), role)| state.users.get(u).map(|user| (*role, user)))
            .collect();
        members.sort_by(|(ra, a), (rb, b)| {
            let leader_first = (*rb == MembershipRole::Leader).cmp(&(*ra == MembershipRole::Leader));
            leader_first.then_with(|| a.name.cmp(&b.name))
        });
        Ok(members.into_iter().map(|(_, user)| user.clone()).collect())
    }

    async fn is_joined(&self, user_id: &str, club_id: i32) -> StorageResult<bool> {
        let state = self.state()?;
        Ok(state.members.contains_key(&(user_id.to_string(), club_id)))
    }

    async fn insert_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let mut state = self.state()?;
        state.check_references(user_id, club_id)?;
        let key = (user_id.to_string(), club_id);
        if state.members.contains_key(&key) {
            return Ok(0);
        }
        state.members.insert(key, MembershipRole::Member);
        Ok(1)
    }

    async fn delete_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let mut state = self.state()?;
        Ok(state
            .members
            .remove(&(user_id.to_string(), club_id))
            .map_or(0, |_| 1))
    }

    async fn insert_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let mut state = self.state()?;
        state.check_references(user_id, club_id)?;
        Ok(usize::from(state.likes.insert((user_id.to_string(), club_id))))
    }

    async fn delete_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let mut state = self.state()?;
        Ok(usize::from(state.likes.remove(&(user_id.to_string(), club_id))))
    }

    async fn list_board_posts(&self, club_id: i32) -> StorageResult<Vec<Board>> {
        let state = self.state()?;
        let mut posts: Vec<Board> = state
            .boards
            .iter()
            .filter(|b| b.club_id == club_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.reg_date
                .cmp(&a.reg_date)
                .then_with(|| b.board_id.cmp(&a.board_id))
        });
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn club(club_id: i32, name: &str, category: &str) -> ClubRow {
        ClubRow {
            club_id,
            club_name: name.to_string(),
            category: category.to_string(),
            wide_area: "Seoul".to_string(),
            detail_area: "Gangnam".to_string(),
            introduction: String::new(),
            club_img: None,
        }
    }

    fn user(user_id: &str, name: &str) -> User {
        User {
            user_id: user_id.to_string(),
            name: name.to_string(),
            nickname: name.to_lowercase(),
        }
    }

    #[tokio::test]
    async fn duplicate_membership_affects_no_rows() {
        let repo = MemoryClubRepository::new();
        repo.add_club(club(1, "Runners", "running"));
        repo.add_user(user("alice", "Alice"));

        assert_eq!(repo.insert_membership("alice", 1).await.unwrap(), 1);
        assert_eq!(repo.insert_membership("alice", 1).await.unwrap(), 0);
        assert_eq!(repo.count_members(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn membership_requires_existing_club() {
        let repo = MemoryClubRepository::new();
        repo.add_user(user("alice", "Alice"));

        let err = repo.insert_membership("alice", 42).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _
            ))
        ));
    }

    #[tokio::test]
    async fn members_are_listed_leader_first() {
        let repo = MemoryClubRepository::new();
        repo.add_club(club(1, "Runners", "running"));
        repo.add_user(user("alice", "Alice"));
        repo.add_user(user("bob", "Bob"));
        repo.add_user(user("carol", "Carol"));
        repo.add_membership("alice", 1, MembershipRole::Member);
        repo.add_membership("carol", 1, MembershipRole::Leader);
        repo.add_membership("bob", 1, MembershipRole::Member);

        let names: Vec<String> = repo
            .list_members(1)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repo = MemoryClubRepository::new();
        repo.add_club(club(1, "Runners", "running"));
        repo.set_unavailable(true);

        assert!(matches!(
            repo.get_club(1).await,
            Err(StorageError::Unavailable)
        ));

        repo.set_unavailable(false);
        assert!(repo.get_club(1).await.unwrap().is_some());
    }
}
