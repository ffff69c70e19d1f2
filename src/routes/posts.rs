use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{not_found, API_PREFIX};
use crate::db::models::{CreatePost, UpdatePost};
use crate::error::AppResult;
use crate::extractors::{JsonBody, ResourceId};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{API_PREFIX}/posts"),
            get(list_posts).post(create_post).fallback(not_found),
        )
        .route(
            &format!("{API_PREFIX}/posts/{{id}}"),
            get(get_post)
                .put(update_post)
                .delete(delete_post)
                .fallback(not_found),
        )
}

async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let posts = state.posts.get_all_posts().await?;
    Ok(Json(json!({ "posts": posts })))
}

async fn get_post(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<Json<Value>> {
    let post = state.posts.get_post_by_id(id).await?;
    Ok(Json(json!({ "post": post })))
}

async fn create_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreatePost>,
) -> AppResult<Response> {
    let post = state.posts.create_post(input).await?;
    let location = format!("{}/posts/{}", API_PREFIX, post.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "post": post })),
    )
        .into_response())
}

async fn update_post(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(input): JsonBody<UpdatePost>,
) -> AppResult<StatusCode> {
    state.posts.update_post(id, input).await?;
    Ok(StatusCode::OK)
}

async fn delete_post(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<StatusCode> {
    state.posts.delete_post(id).await?;
    Ok(StatusCode::OK)
}
