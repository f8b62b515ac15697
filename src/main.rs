use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use joinup::database::schema;
use joinup::services::notifier::LogNotifier;
use joinup::state::{ActivityLocks, AppState};
use joinup::web::middleware::auth as auth_middleware;
use joinup::web::routes::{activities, participations};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");
    schema::ensure_schema(&pool)
        .await
        .expect("cannot bootstrap schema");

    let state = AppState {
        pool,
        locks: ActivityLocks::default(),
        notifier: Arc::new(LogNotifier),
    };

    let protected_routes = Router::new()
        .route("/activities", post(activities::create_activity_handler))
        .route("/activities/nearby", get(activities::nearby_handler))
        .route("/activities/:activity_id", get(activities::get_activity_handler))
        .route(
            "/activities/:activity_id/cancel",
            post(activities::cancel_activity_handler),
        )
        .route(
            "/activities/:activity_id/interest",
            post(participations::express_interest_handler),
        )
        .route(
            "/activities/:activity_id/leave",
            post(participations::leave_handler),
        )
        .route(
            "/activities/:activity_id/participations/:participation_id/decision",
            post(participations::decision_handler),
        )
        .route(
            "/activities/:activity_id/participations/:participation_id/remove",
            post(participations::remove_handler),
        )
        .route(
            "/activities/:activity_id/roster",
            get(participations::roster_handler),
        )
        .route(
            "/activities/:activity_id/pending",
            get(participations::pending_handler),
        )
        .route(
            "/activities/:activity_id/spots",
            get(participations::spots_handler),
        )
        .route(
            "/me/participations",
            get(participations::my_participations_handler),
        )
        .layer(middleware::from_fn(auth_middleware::require_identity));

    let app = Router::new()
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listener");
    let bound_addr = listener.local_addr().expect("listener has no local addr");
    info!("participation service listening on http://{}", bound_addr);

    axum::serve(listener, app).await.expect("server error");
}
