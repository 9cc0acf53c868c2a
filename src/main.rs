//! Ticket Marketplace - Main Application Entry Point
//!
//! This is a REST API server for a ticket resale marketplace. Users post
//! ticket listings, purchase them from each other, chat about the deal in
//! per-order rooms, and rate each other afterwards. Payments settle through
//! an external provider that reports back over a webhook, and sellers owe
//! the platform a commission on completed orders.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: HMAC-signed session tokens (bearer header or cookie)
//! - **Notifications**: outbound SMS provider calls, best-effort
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    // Admin routes: session auth plus the admin gate
    let admin_routes = Router::new()
        .route("/api/v1/admin/users", get(handlers::admin::list_users))
        .route(
            "/api/v1/admin/users/{id}/suspend",
            post(handlers::admin::suspend_user),
        )
        .route(
            "/api/v1/admin/users/{id}/unsuspend",
            post(handlers::admin::unsuspend_user),
        )
        .route("/api/v1/admin/reports", get(handlers::admin::list_reports))
        .route(
            "/api/v1/admin/reports/{id}/resolve",
            post(handlers::admin::resolve_report),
        )
        .route("/api/v1/admin/fees", get(handlers::admin::list_fees))
        .route(
            "/api/v1/admin/fees/{id}/paid",
            post(handlers::admin::mark_fee_paid),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::auth::admin_middleware,
        ));

    // Routes that require a valid session
    let authenticated_routes = Router::new()
        // Own profile
        .route("/api/v1/users/me", get(handlers::users::me))
        .route("/api/v1/users/me", patch(handlers::users::update_me))
        // Listing management (reading is public, below)
        .route("/api/v1/listings", post(handlers::listings::create_listing))
        .route(
            "/api/v1/listings/{id}",
            patch(handlers::listings::update_listing),
        )
        .route(
            "/api/v1/listings/{id}",
            delete(handlers::listings::delete_listing),
        )
        // Purchase lifecycle
        .route(
            "/api/v1/purchases",
            post(handlers::purchases::create_purchase),
        )
        .route("/api/v1/purchases", get(handlers::purchases::list_purchases))
        .route(
            "/api/v1/purchases/{id}",
            get(handlers::purchases::get_purchase),
        )
        .route(
            "/api/v1/purchases/{id}/complete",
            post(handlers::purchases::complete_purchase),
        )
        .route(
            "/api/v1/purchases/{id}/confirm",
            post(handlers::purchases::confirm_purchase),
        )
        .route(
            "/api/v1/purchases/{id}/cancel",
            post(handlers::purchases::cancel_purchase),
        )
        // Messaging
        .route("/api/v1/rooms", get(handlers::rooms::list_rooms))
        .route(
            "/api/v1/rooms/{id}/messages",
            get(handlers::rooms::list_messages),
        )
        .route(
            "/api/v1/rooms/{id}/messages",
            post(handlers::rooms::send_message),
        )
        // Payments (the webhook itself is public, below)
        .route("/api/v1/payments/{id}", get(handlers::payments::get_payment))
        // Notification log
        .route(
            "/api/v1/notifications",
            get(handlers::notifications::list_notifications),
        )
        // Ratings and reports
        .route("/api/v1/ratings", post(handlers::ratings::create_rating))
        .route("/api/v1/reports", post(handlers::reports::create_report))
        // Admin group is nested inside so the session middleware covers it
        .merge(admin_routes)
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/signup", post(handlers::auth::signup))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/listings", get(handlers::listings::list_listings))
        .route("/api/v1/listings/{id}", get(handlers::listings::get_listing))
        .route("/api/v1/users/{id}", get(handlers::users::get_profile))
        .route(
            "/api/v1/users/{id}/ratings",
            get(handlers::ratings::list_user_ratings),
        )
        // Provider server-to-server callback
        .route(
            "/api/v1/payments/webhook",
            post(handlers::payments::payment_webhook),
        )
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // The API is consumed by a browser frontend on another origin
        .layer(CorsLayer::permissive())
        // Share pool + config with all handlers via State extraction
        .with_state(state.clone());

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
