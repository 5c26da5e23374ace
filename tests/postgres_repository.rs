//! Runs the Diesel repository against a real database. Point `DATABASE_URL`
//! at a database with the migrations applied and run
//! `cargo test -- --ignored`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sponity_club::{
    connect_to_db,
    models::SearchCriteria,
    repository::{ClubRepository, PgClubRepository},
    schema::{clubs, users},
    DbPool,
};
use std::time::{SystemTime, UNIX_EPOCH};

struct Fixture {
    pool: DbPool,
    repo: PgClubRepository,
    tag: String,
}

impl Fixture {
    fn new() -> Option<Self> {
        let db_url = std::env::var("DATABASE_URL").ok()?;
        let pool = connect_to_db(&db_url).unwrap();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        Some(Self {
            repo: PgClubRepository::new(pool.clone()),
            pool,
            tag: format!("t{nanos}"),
        })
    }

    async fn add_club(&self, name: &str) -> i32 {
        let conn = &mut self.pool.get().await.unwrap();
        diesel::insert_into(clubs::table)
            .values((
                clubs::club_name.eq(format!("{name} {}", self.tag)),
                clubs::category.eq(&self.tag),
                clubs::wide_area.eq("Seoul"),
                clubs::detail_area.eq("Mapo"),
                clubs::introduction.eq(""),
            ))
            .returning(clubs::club_id)
            .get_result(conn)
            .await
            .unwrap()
    }

    async fn add_user(&self, name: &str) -> String {
        let user_id = format!("{name}-{}", self.tag);
        let conn = &mut self.pool.get().await.unwrap();
        diesel::insert_into(users::table)
            .values((
                users::user_id.eq(&user_id),
                users::name.eq(name),
                users::nickname.eq(name),
            ))
            .execute(conn)
            .await
            .unwrap();
        user_id
    }

    async fn cleanup(&self) {
        let conn = &mut self.pool.get().await.unwrap();
        diesel::delete(clubs::table.filter(clubs::category.eq(&self.tag)))
            .execute(conn)
            .await
            .unwrap();
        diesel::delete(users::table.filter(users::user_id.like(format!("%-{}", self.tag))))
            .execute(conn)
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL with migrations applied"]
async fn repeated_inserts_affect_no_rows() {
    let Some(fx) = Fixture::new() else { return };
    let club_id = fx.add_club("Runners").await;
    let alice = fx.add_user("alice").await;

    assert_eq!(fx.repo.insert_membership(&alice, club_id).await.unwrap(), 1);
    assert_eq!(fx.repo.insert_membership(&alice, club_id).await.unwrap(), 0);
    assert_eq!(fx.repo.insert_like(&alice, club_id).await.unwrap(), 1);
    assert_eq!(fx.repo.insert_like(&alice, club_id).await.unwrap(), 0);

    assert_eq!(fx.repo.count_members(club_id).await.unwrap(), 1);
    assert_eq!(fx.repo.count_likes(club_id).await.unwrap(), 1);

    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL with migrations applied"]
async fn keyword_metacharacters_match_literally() {
    let Some(fx) = Fixture::new() else { return };
    let percent = fx.add_club("100% Fun").await;
    fx.add_club("1000 Fun").await;

    let found = fx
        .repo
        .search(&SearchCriteria {
            category: Some(fx.tag.clone()),
            keyword: Some("100%".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        found.iter().map(|c| c.club_id).collect::<Vec<_>>(),
        vec![percent]
    );

    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL with migrations applied"]
async fn search_counts_members_and_likes_per_club() {
    let Some(fx) = Fixture::new() else { return };
    let busy = fx.add_club("Busy").await;
    let quiet = fx.add_club("Quiet").await;
    let alice = fx.add_user("alice").await;
    let bob = fx.add_user("bob").await;

    fx.repo.insert_membership(&alice, busy).await.unwrap();
    fx.repo.insert_membership(&bob, busy).await.unwrap();
    fx.repo.insert_like(&bob, busy).await.unwrap();

    let found = fx
        .repo
        .search(&SearchCriteria {
            category: Some(fx.tag.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let counts: Vec<_> = found
        .iter()
        .map(|c| (c.club_id, c.member_num, c.like_num))
        .collect();
    assert_eq!(counts, vec![(busy, 2, 1), (quiet, 0, 0)]);

    fx.cleanup().await;
}
