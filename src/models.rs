use crate::schema::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A row of the `clubs` table. Aggregate counts live in [`Club`].
#[derive(Debug, Clone, Queryable)]
pub struct ClubRow {
    pub club_id: i32,
    pub club_name: String,
    pub category: String,
    pub wide_area: String,
    pub detail_area: String,
    pub introduction: String,
    pub club_img: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub club_id: i32,
    pub club_name: String,
    pub category: String,
    pub wide_area: String,
    pub detail_area: String,
    pub introduction: String,
    pub club_img: Option<String>,
    pub member_num: i64,
    pub like_num: i64,
}

impl Club {
    pub fn from_row(row: ClubRow, member_num: i64, like_num: i64) -> Self {
        Self {
            club_id: row.club_id,
            club_name: row.club_name,
            category: row.category,
            wide_area: row.wide_area,
            detail_area: row.detail_area,
            introduction: row.introduction,
            club_img: row.club_img,
            member_num,
            like_num,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub board_id: i32,
    pub club_id: i32,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub view_cnt: i32,
    pub reg_date: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub struct NewMembership<'a> {
    pub user_id: &'a str,
    pub club_id: i32,
    pub leader: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = club_likes)]
pub struct NewLike<'a> {
    pub user_id: &'a str,
    pub club_id: i32,
}

/// Role stored in the `members.leader` column as `Y`/`N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRole {
    Member,
    Leader,
}

impl MembershipRole {
    pub fn as_flag(self) -> &'static str {
        match self {
            MembershipRole::Member => "N",
            MembershipRole::Leader => "Y",
        }
    }

    pub fn from_flag(flag: &str) -> Self {
        if flag.eq_ignore_ascii_case("Y") {
            MembershipRole::Leader
        } else {
            MembershipRole::Member
        }
    }
}

/// A caller's standing in a club. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    NotMember,
    Member,
    Leader,
}

impl UserStatus {
    pub fn code(self) -> u8 {
        match self {
            UserStatus::NotMember => 1,
            UserStatus::Member => 2,
            UserStatus::Leader => 3,
        }
    }
}

impl From<Option<MembershipRole>> for UserStatus {
    fn from(role: Option<MembershipRole>) -> Self {
        match role {
            None => UserStatus::NotMember,
            Some(MembershipRole::Member) => UserStatus::Member,
            Some(MembershipRole::Leader) => UserStatus::Leader,
        }
    }
}

impl Serialize for UserStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Search filters. Missing and blank values are ignored; anything else is
/// matched as given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub category: Option<String>,
    pub wide_area: Option<String>,
    pub detail_area: Option<String>,
    pub keyword: Option<String>,
}

impl SearchCriteria {
    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    pub fn wide_area(&self) -> Option<&str> {
        non_empty(&self.wide_area)
    }

    pub fn detail_area(&self) -> Option<&str> {
        non_empty(&self.detail_area)
    }

    pub fn keyword(&self) -> Option<&str> {
        non_empty(&self.keyword)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Identifies one (user, club) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub user_id: String,
    pub club_id: i32,
}

impl MembershipKey {
    pub fn new(user_id: impl Into<String>, club_id: i32) -> Self {
        Self {
            user_id: user_id.into(),
            club_id,
        }
    }
}
