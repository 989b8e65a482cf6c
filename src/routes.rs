use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config;
use crate::error::ApiError;
use crate::handlers::{elevated::admin, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware, validate_session_middleware};

/// The full application router
pub fn app() -> Router {
    let config = config::config();

    Router::new()
        .route("/", get(public::home::root))
        .route("/health", get(public::home::health))
        .merge(auth_public_routes())
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/signin", post(auth::signin_post))
}

/// Everything under /api. Layers added last run first: the token is decoded,
/// then the session row is checked.
fn api_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(application_routes())
        .merge(session_routes())
        .merge(message_routes())
        .merge(forum_routes())
        .merge(checkin_routes())
        .nest("/admin", admin_routes())
        .route_layer(from_fn(validate_session_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn auth_routes() -> Router {
    use protected::auth;

    Router::new()
        .route("/auth/whoami", get(auth::session_whoami))
        .route("/auth/session/refresh", put(auth::session_refresh))
        .route("/auth/session", axum::routing::delete(auth::session_signout))
}

fn profile_routes() -> Router {
    use protected::profile;

    Router::new()
        .route("/profile", get(profile::profile_get).put(profile::profile_put))
        .route("/profiles/:user_id", get(profile::profile_show))
        .route("/counselors", get(profile::counselors_get))
}

fn application_routes() -> Router {
    use protected::applications;

    Router::new()
        .route("/counselor-applications", post(applications::application_post))
        .route("/counselor-applications/mine", get(applications::applications_mine))
}

fn session_routes() -> Router {
    use protected::sessions;

    Router::new()
        .route("/sessions", get(sessions::sessions_get).post(sessions::session_post))
        .route(
            "/sessions/:id",
            get(sessions::session_show)
                .patch(sessions::session_patch)
                .delete(sessions::session_delete),
        )
}

fn message_routes() -> Router {
    use protected::messages;

    Router::new()
        .route(
            "/sessions/:id/messages",
            get(messages::messages_get).post(messages::message_post),
        )
        .route("/sessions/:id/messages/read", post(messages::session_messages_read))
        .route("/messages/:id/read", post(messages::message_read))
        .route("/messages/unread-count", get(messages::unread_count_get))
}

fn forum_routes() -> Router {
    use protected::forum;

    Router::new()
        .route("/posts", get(forum::posts_get).post(forum::post_post))
        .route(
            "/posts/:id",
            get(forum::post_show).put(forum::post_put).delete(forum::post_delete),
        )
        .route("/posts/:id/comments", post(forum::comment_post))
        .route("/comments/:id", axum::routing::delete(forum::comment_delete))
}

fn checkin_routes() -> Router {
    use protected::checkins;

    Router::new()
        .route("/checkins", get(checkins::checkins_get).post(checkins::checkin_post))
        .route("/checkins/summary", get(checkins::checkin_summary_get))
}

/// Admin-only routes; session validation from `api_routes` wraps these too
fn admin_routes() -> Router {
    Router::new()
        .route("/users", get(admin::users_get))
        .route("/users/:id/role", put(admin::user_role_put))
        .route("/applications", get(admin::applications_get))
        .route("/applications/:id/approve", post(admin::application_approve))
        .route("/applications/:id/reject", post(admin::application_reject))
        .route("/posts/:id/approval", post(admin::post_approval))
        .route("/comments/:id/approval", post(admin::comment_approval))
        .route_layer(from_fn(require_admin_middleware))
}

/// Empty origin list allows any origin (development default)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS];

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(Any)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
