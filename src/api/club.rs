use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{Board, Club, MembershipKey, SearchCriteria, User},
    service::{ClubDetail, ClubService, JoinOutcome, LeaveOutcome, LikeOutcome},
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

fn join_response(outcome: JoinOutcome) -> (StatusCode, Json<u8>) {
    match outcome {
        JoinOutcome::AlreadyMember => (StatusCode::BAD_REQUEST, Json(1)),
        JoinOutcome::Joined => (StatusCode::OK, Json(2)),
        JoinOutcome::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, Json(3)),
    }
}

fn leave_response(outcome: LeaveOutcome) -> (StatusCode, Json<u8>) {
    match outcome {
        LeaveOutcome::NotMember => (StatusCode::BAD_REQUEST, Json(1)),
        LeaveOutcome::Left => (StatusCode::OK, Json(2)),
        LeaveOutcome::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, Json(3)),
    }
}

fn like_response(outcome: LikeOutcome) -> StatusCode {
    match outcome {
        LikeOutcome::Applied => StatusCode::OK,
        LikeOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn club_not_found() -> AppError {
    AppError::not_found("the club does not exist")
}

async fn search(
    Extension(service): Extension<ClubService>,
    Json(criteria): Json<SearchCriteria>,
) -> AppResult<Json<Vec<Club>>> {
    Ok(Json(service.search(&criteria).await?))
}

async fn detail(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
    AuthUser { user_id }: AuthUser,
) -> AppResult<Json<ClubDetail>> {
    let key = MembershipKey::new(user_id, club_id);

    service
        .detail(&key)
        .await?
        .map(Json)
        .ok_or_else(club_not_found)
}

async fn join(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
    AuthUser { user_id }: AuthUser,
) -> (StatusCode, Json<u8>) {
    join_response(service.join(&MembershipKey::new(user_id, club_id)).await)
}

async fn leave(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
    AuthUser { user_id }: AuthUser,
) -> (StatusCode, Json<u8>) {
    leave_response(service.leave(&MembershipKey::new(user_id, club_id)).await)
}

async fn like(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
    AuthUser { user_id }: AuthUser,
) -> StatusCode {
    like_response(service.like(&MembershipKey::new(user_id, club_id)).await)
}

async fn dislike(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
    AuthUser { user_id }: AuthUser,
) -> StatusCode {
    like_response(service.dislike(&MembershipKey::new(user_id, club_id)).await)
}

async fn board_list(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
) -> AppResult<Json<Vec<Board>>> {
    service
        .board_list(club_id)
        .await?
        .map(Json)
        .ok_or_else(club_not_found)
}

async fn member_list(
    Extension(service): Extension<ClubService>,
    Path(club_id): Path<i32>,
) -> AppResult<Json<Vec<User>>> {
    service
        .member_list(club_id)
        .await?
        .map(Json)
        .ok_or_else(club_not_found)
}

pub fn app() -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/:club_id", get(detail).post(join).delete(leave))
        .route("/:club_id/like", post(like).delete(dislike))
        .route("/:club_id/board", get(board_list))
        .route("/:club_id/members", get(member_list))
}
