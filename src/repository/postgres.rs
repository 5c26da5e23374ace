use super::{ClubRepository, StorageError, StorageResult};
use crate::{
    models::{Board, Club, ClubRow, MembershipRole, NewLike, NewMembership, SearchCriteria, User},
    schema::*,
    DbPool,
};
use async_trait::async_trait;
use deadpool::managed::Object;
use diesel::{
    dsl::{count_star, exists},
    pg::Pg,
    prelude::*,
};
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;

type PgConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Clone)]
pub struct PgClubRepository {
    pool: DbPool,
}

impl PgClubRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StorageResult<PgConnection> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::Pool(e.to_string()))
    }
}

/// Escapes `LIKE` metacharacters so the keyword is matched literally.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn load_clubs(conn: &mut PgConnection, rows: Vec<ClubRow>) -> StorageResult<Vec<Club>> {
    let ids: Vec<i32> = rows.iter().map(|r| r.club_id).collect();

    let members: HashMap<i32, i64> = members::table
        .filter(members::club_id.eq_any(ids.iter().copied()))
        .group_by(members::club_id)
        .select((members::club_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await?
        .into_iter()
        .collect();
    let likes: HashMap<i32, i64> = club_likes::table
        .filter(club_likes::club_id.eq_any(ids.iter().copied()))
        .group_by(club_likes::club_id)
        .select((club_likes::club_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let member_num = members.get(&row.club_id).copied().unwrap_or(0);
            let like_num = likes.get(&row.club_id).copied().unwrap_or(0);
            Club::from_row(row, member_num, like_num)
        })
        .collect())
}

#[async_trait]
impl ClubRepository for PgClubRepository {
    async fn search(&self, criteria: &SearchCriteria) -> StorageResult<Vec<Club>> {
        let conn = &mut self.conn().await?;

        let mut query: clubs::BoxedQuery<'_, Pg> = clubs::table.into_boxed();
        if let Some(category) = criteria.category() {
            query = query.filter(clubs::category.eq(category.to_owned()));
        }
        if let Some(wide_area) = criteria.wide_area() {
            query = query.filter(clubs::wide_area.eq(wide_area.to_owned()));
        }
        if let Some(detail_area) = criteria.detail_area() {
            query = query.filter(clubs::detail_area.eq(detail_area.to_owned()));
        }
        if let Some(keyword) = criteria.keyword() {
            let pattern = like_pattern(keyword);
            query = query.filter(
                clubs::club_name
                    .ilike(pattern.clone())
                    .or(clubs::introduction.ilike(pattern)),
            );
        }

        let rows = query
            .order(clubs::club_id.asc())
            .load::<ClubRow>(conn)
            .await?;

        load_clubs(conn, rows).await
    }

    async fn get_club(&self, club_id: i32) -> StorageResult<Option<ClubRow>> {
        let conn = &mut self.conn().await?;

        Ok(clubs::table
            .find(club_id)
            .first::<ClubRow>(conn)
            .await
            .optional()?)
    }

    async fn count_members(&self, club_id: i32) -> StorageResult<i64> {
        let conn = &mut self.conn().await?;

        Ok(members::table
            .filter(members::club_id.eq(club_id))
            .count()
            .get_result(conn)
            .await?)
    }

    async fn count_likes(&self, club_id: i32) -> StorageResult<i64> {
        let conn = &mut self.conn().await?;

        Ok(club_likes::table
            .filter(club_likes::club_id.eq(club_id))
            .count()
            .get_result(conn)
            .await?)
    }

    async fn membership_role(
        &self,
        user_id: &str,
        club_id: i32,
    ) -> StorageResult<Option<MembershipRole>> {
        let conn = &mut self.conn().await?;

        let flag = members::table
            .filter(members::user_id.eq(user_id))
            .filter(members::club_id.eq(club_id))
            .select(members::leader)
            .first::<String>(conn)
            .await
            .optional()?;

        Ok(flag.map(|f| MembershipRole::from_flag(&f)))
    }

    async fn has_like(&self, user_id: &str, club_id: i32) -> StorageResult<bool> {
        let conn = &mut self.conn().await?;

        Ok(diesel::select(exists(
            club_likes::table
                .filter(club_likes::user_id.eq(user_id))
                .filter(club_likes::club_id.eq(club_id)),
        ))
        .get_result(conn)
        .await?)
    }

    async fn list_members(&self, club_id: i32) -> StorageResult<Vec<User>> {
        let conn = &mut self.conn().await?;

        // leaders ('Y') sort ahead of members ('N')
        Ok(members::table
            .inner_join(users::table)
            .filter(members::club_id.eq(club_id))
            .order((members::leader.desc(), users::name.asc()))
            .select((users::user_id, users::name, users::nickname))
            .load::<User>(conn)
            .await?)
    }

    async fn is_joined(&self, user_id: &str, club_id: i32) -> StorageResult<bool> {
        let conn = &mut self.conn().await?;

        Ok(diesel::select(exists(
            members::table
                .filter(members::user_id.eq(user_id))
                .filter(members::club_id.eq(club_id)),
        ))
        .get_result(conn)
        .await?)
    }

    async fn insert_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let conn = &mut self.conn().await?;

        Ok(diesel::insert_into(members::table)
            .values(NewMembership {
                user_id,
                club_id,
                leader: MembershipRole::Member.as_flag(),
            })
            .on_conflict_do_nothing()
            .execute(conn)
            .await?)
    }

    async fn delete_membership(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let conn = &mut self.conn().await?;

        Ok(diesel::delete(
            members::table
                .filter(members::user_id.eq(user_id))
                .filter(members::club_id.eq(club_id)),
        )
        .execute(conn)
        .await?)
    }

    async fn insert_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let conn = &mut self.conn().await?;

        Ok(diesel::insert_into(club_likes::table)
            .values(NewLike { user_id, club_id })
            .on_conflict_do_nothing()
            .execute(conn)
            .await?)
    }

    async fn delete_like(&self, user_id: &str, club_id: i32) -> StorageResult<usize> {
        let conn = &mut self.conn().await?;

        Ok(diesel::delete(
            club_likes::table
                .filter(club_likes::user_id.eq(user_id))
                .filter(club_likes::club_id.eq(club_id)),
        )
        .execute(conn)
        .await?)
    }

    async fn list_board_posts(&self, club_id: i32) -> StorageResult<Vec<Board>> {
        let conn = &mut self.conn().await?;

        Ok(boards::table
            .filter(boards::club_id.eq(club_id))
            .order((boards::reg_date.desc(), boards::board_id.desc()))
            .load::<Board>(conn)
            .await?)
    }
}
