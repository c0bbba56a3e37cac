use crate::handlers::{self, auth_handlers, contact_handlers, user_handlers};
use crate::middleware::{enforce_rate_limit, RouteLimit};
use crate::AppState;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Per-route request budgets as `(times, seconds)`.
const ROOT_LIMIT: (u32, u64) = (2, 5);
const SIGNUP_LIMIT: (u32, u64) = (5, 60);
const READ_LIMIT: (u32, u64) = (10, 60);
const WRITE_LIMIT: (u32, u64) = (1, 5);

pub fn build_router(state: AppState) -> Router {
    let limiter = state.rate_limiter.clone();
    let limited = |route: MethodRouter<AppState>,
                   (times, seconds): (u32, u64)|
     -> MethodRouter<AppState> {
        route.layer(middleware::from_fn_with_state(
            RouteLimit::new(limiter.clone(), times, seconds),
            enforce_rate_limit,
        ))
    };

    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .route("/", limited(get(handlers::root), ROOT_LIMIT))
        // Auth
        .route(
            "/api/auth/signup",
            limited(post(auth_handlers::signup), SIGNUP_LIMIT),
        )
        .route(
            "/api/auth/login",
            limited(post(auth_handlers::login), READ_LIMIT),
        )
        .route(
            "/api/auth/refresh_token",
            limited(get(auth_handlers::refresh_token), READ_LIMIT),
        )
        .route(
            "/api/auth/confirmed_email/{token}",
            limited(get(auth_handlers::confirmed_email), READ_LIMIT),
        )
        .route(
            "/api/auth/request_email",
            limited(post(auth_handlers::request_email), WRITE_LIMIT),
        )
        // Users
        .route(
            "/api/users/me/",
            limited(get(user_handlers::me), READ_LIMIT),
        )
        .route(
            "/api/users/avatar",
            limited(patch(user_handlers::update_avatar), WRITE_LIMIT),
        )
        // Contacts
        .route(
            "/api/contacts/",
            limited(get(contact_handlers::list_contacts), READ_LIMIT),
        )
        .route(
            "/api/contacts/new",
            limited(post(contact_handlers::create_contact), WRITE_LIMIT),
        )
        .route(
            "/api/contacts/next_week_birthdays/",
            limited(get(contact_handlers::next_week_birthdays), READ_LIMIT),
        )
        .route(
            "/api/contacts/by_name/{name}",
            limited(get(contact_handlers::contacts_by_name), READ_LIMIT),
        )
        .route(
            "/api/contacts/by_surname/{surname}",
            limited(get(contact_handlers::contacts_by_surname), READ_LIMIT),
        )
        .route(
            "/api/contacts/by_email/{email}",
            limited(get(contact_handlers::contacts_by_email), READ_LIMIT),
        )
        .route(
            "/api/contacts/{contact_id}",
            limited(get(contact_handlers::get_contact), READ_LIMIT),
        )
        .route(
            "/api/contacts/{contact_id}/update",
            limited(put(contact_handlers::update_contact), WRITE_LIMIT),
        )
        .route(
            "/api/contacts/{contact_id}/delete",
            limited(delete(contact_handlers::delete_contact), WRITE_LIMIT),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured origins. Invalid origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
