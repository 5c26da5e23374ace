use axum::Router;

pub mod club;

pub fn app() -> Router {
    Router::new().nest("/club", club::app())
}
