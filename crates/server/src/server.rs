use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use documents::{CompanyProfile, Mailer};
use engine::{Engine, EngineError};
use serde::Serialize;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use crate::{ServerError, auth, budgets, customers, exports, notify};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborators shared by every request, built once at start-up.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub verifier: Arc<auth::TokenVerifier>,
    pub mailer: Arc<dyn Mailer>,
    pub company: Arc<CompanyProfile>,
    pub request_timeout: Duration,
}

impl ServerState {
    pub fn new(
        engine: Engine,
        verifier: auth::TokenVerifier,
        mailer: Arc<dyn Mailer>,
        company: CompanyProfile,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier: Arc::new(verifier),
            mailer,
            company: Arc::new(company),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Runs an engine call under the request timeout.
    pub(crate) async fn call<T>(
        &self,
        operation: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, ServerError> {
        self.within(operation).await?.map_err(ServerError::from)
    }

    pub(crate) async fn within<T>(&self, operation: impl Future<Output = T>) -> Result<T, ServerError> {
        tokio::time::timeout(self.request_timeout, operation)
            .await
            .map_err(|_| {
                tracing::warn!("request timed out after {:?}", self.request_timeout);
                ServerError::Unavailable
            })
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/api/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/api/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/api/budgets/{id}",
            get(budgets::get).put(budgets::update).delete(budgets::delete),
        )
        .route("/api/budgets/{id}/pdf", get(exports::budget_pdf))
        .route("/api/budgets/{id}/whatsapp", get(notify::whatsapp))
        .route("/api/budgets/{id}/send-email", post(notify::send_email))
        .route("/api/export/customers", get(exports::customers))
        .route("/api/export/budgets", get(exports::budgets))
        .route("/api/export/monthly-report", get(exports::monthly_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_tenant,
        ))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(state, listener).await
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
