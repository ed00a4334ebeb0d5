//! HTTP surface
//!
//! - `POST /graphql` executes a GraphQL request
//! - `GET /graphql` and `GET /` serve GraphiQL when enabled
//! - `GET /health` answers `ok`

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::CurrentUser;
use crate::graphql::AppSchema;

#[derive(Clone)]
struct AppState {
    schema: AppSchema,
    graphiql: bool,
}

/// Build the router serving `schema`
pub fn router(schema: AppSchema, graphiql: bool) -> Router {
    Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/", get(graphiql_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { schema, graphiql })
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(caller) = CurrentUser::from_headers(&headers) {
        request = request.data(caller);
    }
    state.schema.execute(request).await.into()
}

async fn graphiql_handler(State(state): State<AppState>) -> Response {
    if !state.graphiql {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CALLER_HEADER;
    use crate::graphql::build_schema;
    use crate::hashing::PasswordHasher;
    use crate::service::BookingService;
    use crate::storage::MemoryStorage;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(graphiql: bool) -> Router {
        let service = BookingService::new(Arc::new(MemoryStorage::new()), PasswordHasher::new(4), 10);
        router(build_schema(service), graphiql)
    }

    async fn post_graphql(app: Router, query: &str, caller: Option<&str>) -> Value {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller);
        }
        let body = Body::from(json!({ "query": query }).to_string());
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_graphiql_toggle() {
        let enabled = app(true)
            .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(enabled.status(), StatusCode::OK);

        let disabled = app(false)
            .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(disabled.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_caller_header_reaches_create_event() {
        let app = app(false);
        let created = post_graphql(
            app.clone(),
            r#"mutation { createUser(userInput: { email: "host@example.com", password: "s3cret" }) { _id } }"#,
            None,
        )
        .await;
        let user_id = created["data"]["createUser"]["_id"].as_str().unwrap().to_string();

        let mutation = r#"mutation { createEvent(eventInput: { title: "Meetup", description: "Talks", price: 19.99, date: "2021-06-01T00:00:00.000Z" }) { title creator { email } } }"#;

        let anonymous = post_graphql(app.clone(), mutation, None).await;
        assert!(anonymous["errors"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("unauthenticated"));

        let authed = post_graphql(app, mutation, Some(&user_id)).await;
        assert_eq!(
            authed["data"]["createEvent"],
            json!({ "title": "Meetup", "creator": { "email": "host@example.com" } })
        );
    }
}
