//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        classify_llm::OpenAiClassifyAdapter, db::PgAdapter, embeddings::OpenAiEmbeddingAdapter,
        pattern_llm::OpenAiPatternAdapter, sst::OpenAiSstAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        middleware::require_auth,
        rest::{
            analyze_thought_handler, list_recall_handler, recall_action_handler,
            recall_count_handler, recent_patterns_handler, submit_thought_handler,
            transcribe_handler, ApiDoc,
        },
        state::AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(PgAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    // Without an API key the AI adapters degrade: capture still works,
    // previews and patterns just come back empty.
    let openai_client: Option<Client<OpenAIConfig>> = match &config.openai_api_key {
        Some(key) => Some(Client::with_config(OpenAIConfig::new().with_api_key(key))),
        None => {
            warn!("OPENAI_API_KEY not set; classification, embeddings, pattern detection and transcription are disabled");
            None
        }
    };

    let classifier = Arc::new(OpenAiClassifyAdapter::new(
        openai_client.clone(),
        config.classify_model.clone(),
    ));
    let embedder = Arc::new(OpenAiEmbeddingAdapter::new(
        openai_client.clone(),
        config.embed_model.clone(),
    ));
    let detector = Arc::new(OpenAiPatternAdapter::new(
        openai_client.clone(),
        config.pattern_model.clone(),
    ));
    let transcriber = Arc::new(OpenAiSstAdapter::new(
        openai_client.clone(),
        config.sst_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        classifier,
        embedder,
        detector,
        transcriber,
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/thoughts/analyze", post(analyze_thought_handler))
        .route("/thoughts", post(submit_thought_handler))
        .route("/recall", get(list_recall_handler))
        .route("/recall/count", get(recall_count_handler))
        .route("/recall/{thought_id}", post(recall_action_handler))
        .route("/patterns/recent", get(recent_patterns_handler))
        .route("/transcribe", post(transcribe_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
