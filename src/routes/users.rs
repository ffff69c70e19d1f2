use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{not_found, API_PREFIX};
use crate::db::models::{CreateUser, UpdateUser};
use crate::error::AppResult;
use crate::extractors::{JsonBody, ResourceId};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{API_PREFIX}/users"),
            get(list_users).post(create_user).fallback(not_found),
        )
        .route(
            &format!("{API_PREFIX}/users/{{id}}"),
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(not_found),
        )
        .route(
            &format!("{API_PREFIX}/users/{{id}}/posts"),
            get(list_user_posts).fallback(not_found),
        )
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let users = state.users.get_all_users().await?;
    Ok(Json(json!({ "users": users })))
}

async fn get_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<Json<Value>> {
    let user = state.users.get_user_by_id(id).await?;
    Ok(Json(json!({ "user": user })))
}

async fn create_user(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUser>,
) -> AppResult<Response> {
    let user = state.users.create_user(input).await?;
    let location = format!("{}/users/{}", API_PREFIX, user.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "user": user })),
    )
        .into_response())
}

async fn update_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(input): JsonBody<UpdateUser>,
) -> AppResult<StatusCode> {
    state.users.update_user(id, input).await?;
    Ok(StatusCode::OK)
}

async fn delete_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<StatusCode> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::OK)
}

async fn list_user_posts(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> AppResult<Json<Value>> {
    let posts = state.posts.get_posts_by_user_id(id).await?;
    Ok(Json(json!({ "posts": posts })))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, StatusCode};
    use chrono::Utc;

    use crate::db::models::{Post, User};
    use crate::routes::test_support::{send, state};
    use crate::service::post::MockPostService;
    use crate::service::user::MockUserService;
    use crate::service::{ErrorKind, ServiceError};

    fn sample_user(id: i64) -> User {
        User {
            id,
            first_name: "A".into(),
            last_name: "B".into(),
            username: "ab".into(),
            email: "a@b.com".into(),
            password_hash: "$2b$04$hashhashhash".into(),
            picture: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn users_only(users: MockUserService) -> crate::state::AppState {
        state(users, MockPostService::new())
    }

    #[tokio::test]
    async fn non_numeric_id_is_400_without_service_call() {
        // No expectations: any service call would panic.
        let app_state = users_only(MockUserService::new());

        for method in [Method::GET, Method::DELETE] {
            let res = send(app_state.clone(), method, "/api/v1/users/abc", None).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert_eq!(res.body["error"]["type"], "BAD_REQUEST");
            assert_eq!(
                res.body["error"]["message"],
                "Error parsing the path variable 'abc' on the URL."
            );
        }

        let res = send(
            app_state,
            Method::PUT,
            "/api/v1/users/abc",
            Some(r#"{"first_name":"A","last_name":"B","email":"a@b.com"}"#),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_with_no_users_is_empty_array() {
        let mut users = MockUserService::new();
        users.expect_get_all_users().returning(|| Ok(Vec::new()));

        let res = send(users_only(users), Method::GET, "/api/v1/users", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body["users"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_user_returns_user_without_password() {
        let mut users = MockUserService::new();
        users
            .expect_get_user_by_id()
            .withf(|id| *id == 4)
            .returning(|id| Ok(sample_user(id)));

        let res = send(users_only(users), Method::GET, "/api/v1/users/4", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["user"]["id"], 4);
        assert!(res.body["user"].get("password_hash").is_none());
        assert!(res.body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn missing_user_is_404() {
        let mut users = MockUserService::new();
        users.expect_get_user_by_id().returning(|id| {
            Err(ServiceError::new(
                ErrorKind::ResourceNotFound,
                format!("There is not a user with id '{}'.", id),
                "missing",
            ))
        });

        let res = send(users_only(users), Method::GET, "/api/v1/users/9", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["error"]["type"], "RESOURCE_NOT_FOUND");
        assert_eq!(
            res.body["error"]["message"],
            "There is not a user with id '9'."
        );
    }

    #[tokio::test]
    async fn create_returns_201_with_location() {
        let mut users = MockUserService::new();
        users
            .expect_create_user()
            .withf(|input| input.username == "ab" && input.password == "x")
            .times(1)
            .returning(|_| Ok(sample_user(7)));

        let res = send(
            users_only(users),
            Method::POST,
            "/api/v1/users",
            Some(r#"{"first_name":"A","last_name":"B","username":"ab","password":"x","email":"a@b.com"}"#),
        )
        .await;

        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.headers[header::LOCATION], "/api/v1/users/7");
        assert_eq!(res.body["user"]["id"], 7);
        assert!(res.body["user"].get("password_hash").is_none());
        assert!(res.body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app_state = users_only(MockUserService::new());

        for body in [
            "{not json",
            r#"{"first_name":"A"}"#,
            r#"{"first_name":1,"last_name":"B","username":"ab","password":"x","email":"a@b.com"}"#,
        ] {
            let res = send(app_state.clone(), Method::POST, "/api/v1/users", Some(body)).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert_eq!(res.body["error"]["type"], "BAD_REQUEST");
            assert_eq!(res.body["error"]["message"], "The request is malformed.");
        }
    }

    #[tokio::test]
    async fn update_returns_200_with_empty_body() {
        let mut users = MockUserService::new();
        users
            .expect_update_user()
            .withf(|id, input| *id == 5 && input.email == "new@b.com")
            .times(1)
            .returning(|_, _| Ok(()));

        let res = send(
            users_only(users),
            Method::PUT,
            "/api/v1/users/5",
            Some(r#"{"first_name":"A","last_name":"B","email":"new@b.com"}"#),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body.is_null());
    }

    #[tokio::test]
    async fn update_rule_violations_are_400() {
        let mut users = MockUserService::new();
        users.expect_update_user().returning(|_, _| {
            Err(ServiceError::new(
                ErrorKind::RepeatedEmail,
                "There can't be two users with the same email.",
                "You need to choose another email for this user.",
            ))
        });

        let res = send(
            users_only(users),
            Method::PUT,
            "/api/v1/users/5",
            Some(r#"{"first_name":"A","last_name":"B","email":"taken@b.com"}"#),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["status_code"], "400");
        assert_eq!(res.body["error"]["type"], "REPEATED_EMAIL");
    }

    #[tokio::test]
    async fn delete_returns_200_then_404() {
        let mut users = MockUserService::new();
        let mut seq = mockall::Sequence::new();
        users
            .expect_delete_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        users
            .expect_delete_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(ServiceError::new(
                    ErrorKind::ResourceNotFound,
                    "There is not a user with id '3'.",
                    "missing",
                ))
            });

        let app_state = users_only(users);
        let res = send(app_state.clone(), Method::DELETE, "/api/v1/users/3", None).await;
        assert_eq!(res.status, StatusCode::OK);

        let res = send(app_state, Method::DELETE, "/api/v1/users/3", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_posts_are_listed() {
        let mut posts = MockPostService::new();
        posts
            .expect_get_posts_by_user_id()
            .withf(|user_id| *user_id == 2)
            .returning(|user_id| {
                Ok(vec![Post {
                    id: 1,
                    user_id,
                    title: "t".into(),
                    body: "b".into(),
                    created_at: Utc::now(),
                    updated_at: None,
                }])
            });

        let res = send(
            state(MockUserService::new(), posts),
            Method::GET,
            "/api/v1/users/2/posts",
            None,
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["posts"][0]["user_id"], 2);
    }
}
