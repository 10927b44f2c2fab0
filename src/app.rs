use crate::auth::require_bearer;
use crate::handlers;
use crate::models::{BonusRecord, WeeklyRecord};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/weekly-data",
            get(handlers::list::<WeeklyRecord>).post(handlers::create::<WeeklyRecord>),
        )
        .route(
            "/weekly-data/:id",
            put(handlers::update::<WeeklyRecord>).delete(handlers::delete::<WeeklyRecord>),
        )
        .route(
            "/bonuses",
            get(handlers::list::<BonusRecord>).post(handlers::create::<BonusRecord>),
        )
        .route(
            "/bonuses/:id",
            put(handlers::update::<BonusRecord>).delete(handlers::delete::<BonusRecord>),
        )
        .route("/stats", get(handlers::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .merge(protected)
        .with_state(state)
}
