/// Application state and router builder
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /contact                         # POST: public lead intake (throttled)
/// ├── /analytics/events                # POST: page-view beacon (public)
/// ├── /auth/
/// │   ├── POST /login                  # throttled
/// │   ├── POST /logout
/// │   ├── POST /forgot-password
/// │   └── POST /reset-password
/// └── /admin/
///     ├── GET  /                       # dashboard (redirecting session guard)
///     ├── GET  /audit-log              # admin page (redirecting admin guard)
///     └── /api/                        # JSON actions (asserting guards)
///         ├── /leads/...               # staff (lead delete checks admin in-handler)
///         └── /users/...               # admin only
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session guards (per-route-group)

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use leadline_shared::{
    auth::guard,
    mailer::Mailer,
    throttle::{login::LoginThrottle, submission::SubmissionThrottle},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; everything inside is an
/// Arc or a pool handle, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Failed-login throttle (process-local)
    pub login_throttle: Arc<LoginThrottle>,

    /// Public-form submission throttle (process-local)
    pub submission_throttle: Arc<SubmissionThrottle>,

    /// Cached admin view payloads
    pub view_cache: Arc<crate::cache::ViewCache>,

    /// Transactional email collaborator
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            login_throttle: Arc::new(LoginThrottle::new()),
            submission_throttle: Arc::new(SubmissionThrottle::new()),
            view_cache: Arc::new(crate::cache::ViewCache::new()),
            mailer,
        }
    }

    /// Gets the session signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no auth
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/contact", post(routes::contact::submit_contact))
        .route(
            "/analytics/events",
            post(routes::analytics::record_event),
        );

    // Auth entry points, no auth
    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    // Staff-level JSON actions (asserting guard: 401/403, never redirects)
    let staff_api_routes = Router::new()
        .route("/leads", get(routes::leads::list_leads))
        .route(
            "/leads/:id",
            get(routes::leads::get_lead).delete(routes::leads::delete_lead),
        )
        .route("/leads/:id/events", get(routes::leads::list_lead_events))
        .route("/leads/:id/status", post(routes::leads::update_status))
        .route("/leads/:id/priority", post(routes::leads::update_priority))
        .route(
            "/leads/:id/assignment",
            post(routes::leads::update_assignment),
        )
        .route("/leads/:id/follow-up", post(routes::leads::update_follow_up))
        .route("/leads/:id/notes", post(routes::leads::add_note))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            assert_session_layer,
        ));

    // Admin-only JSON actions
    let admin_api_routes = Router::new()
        .route("/users", post(routes::users::create_user))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", delete(routes::users::delete_user))
        .route(
            "/users/:id/force-logout",
            post(routes::users::force_logout),
        )
        .route(
            "/users/:id/force-logout",
            delete(routes::users::clear_force_logout),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            assert_admin_session_layer,
        ));

    // Admin pages (redirecting guards)
    let admin_pages = Router::new()
        .route("/", get(routes::dashboard::overview))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session_layer,
        ));

    let admin_only_pages = Router::new()
        .route("/audit-log", get(routes::dashboard::audit_log))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_session_layer,
        ));

    let admin_routes = Router::new()
        .merge(admin_pages)
        .merge(admin_only_pages)
        .nest("/api", staff_api_routes.merge(admin_api_routes));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    let enable_hsts = state.config.api.site_base_url.starts_with("https://");

    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(enable_hsts))
        .with_state(state)
}

/// Asserting session guard: 401 for anonymous callers
async fn assert_session_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard::assert_session(
        state.db.clone(),
        state.session_secret().to_string(),
        req,
        next,
    )
    .await
    .map_err(ApiError::from)
}

/// Asserting admin guard: 401/403 for anonymous or staff callers
async fn assert_admin_session_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard::assert_admin_session(
        state.db.clone(),
        state.session_secret().to_string(),
        req,
        next,
    )
    .await
    .map_err(ApiError::from)
}

/// Redirecting session guard for page loads
async fn require_session_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    guard::require_session(
        state.db.clone(),
        state.session_secret().to_string(),
        req,
        next,
    )
    .await
}

/// Redirecting admin guard for admin-only page loads
async fn require_admin_session_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    guard::require_admin_session(
        state.db.clone(),
        state.session_secret().to_string(),
        req,
        next,
    )
    .await
}
