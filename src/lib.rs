use axum::{
    Router,
    routing::{get, post, put},
};

use backend::BackendClient;
use config::Config;
use middleware::{auth_middleware, log_errors};

pub mod assignment;
pub mod backend;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod utils;
pub mod validation;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let backend = BackendClient::new(&config.backend_url);
        Self { config, backend }
    }
}

pub fn app(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(routes::health::ping));

    let protected_routes = Router::new()
        // 用户及其群组、房间分配
        .route("/users", post(routes::user::create_user))
        .route("/users/{user_id}", put(routes::user::update_user))
        .route(
            "/users/{user_id}/assignments",
            put(routes::user::update_assignments),
        )
        .route(
            "/users/{user_id}/assignments/preview",
            post(routes::user::preview_assignments),
        )
        // 卡片持有人
        .route("/cards/eligible-owners", get(routes::card::eligible_owners))
        .route("/cards/{card_id}/owner", put(routes::card::assign_owner))
        // 群组
        .route("/groups/{group_id}", put(routes::group::update_group))
        .route(
            "/groups/{group_id}/parent-candidates",
            get(routes::group::parent_candidates),
        )
        // 房间
        .route("/rooms", post(routes::room::create_room))
        .route_layer(axum::middleware::from_fn(auth_middleware));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    // axum 不支持在根路径 nest
    let router = match state.config.api_base_uri.as_str() {
        "" | "/" => api,
        base => Router::new().nest(base, api),
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
