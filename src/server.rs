use crate::error::Result;
use crate::graphql::{create_schema, GraphQLSchema};
use crate::observability;
use crate::storage::Storage;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "crm-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GraphQL handler (supports GET and POST)
async fn graphql_handler(Extension(schema): Extension<GraphQLSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Prometheus text exposition; 503 until the recorder is installed.
async fn metrics() -> impl IntoResponse {
    match observability::render() {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed".to_string()),
    }
}

/// Create the HTTP router with all routes, including GraphQL
pub fn create_server(storage: Arc<dyn Storage>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let schema = create_schema(storage);

    Router::new()
        .route("/health", get(health))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql))
        .route("/metrics", get(metrics))
        .layer(Extension(schema))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port and serve until the process exits
pub async fn start_server(storage: Arc<dyn Storage>, port: u16) -> Result<()> {
    let app = create_server(storage);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("GraphQL:     http://localhost:{port}/graphql");
    info!("GraphiQL UI: http://localhost:{port}/graphiql");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down HTTP server");
        })
        .await?;

    Ok(())
}

/// Binds `addr` (port 0 picks a free port) and serves in a background task.
/// Returns the bound address.
pub fn spawn_server(storage: Arc<dyn Storage>, addr: SocketAddr) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let server = Server::from_tcp(listener)?.serve(create_server(storage).into_make_service());
    let handle = tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("HTTP server stopped: {}", e);
        }
    });
    Ok((local_addr, handle))
}
