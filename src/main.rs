#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    gateway::HttpStudentGateway,
    routes::directory::{
        get_index, internal_delete_student, internal_get_directory, internal_post_close,
        internal_post_draft, internal_post_load, internal_post_open_add,
        internal_post_open_edit, internal_post_submit,
    },
    state::DirectoryState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod directory;
mod error;
mod gateway;
mod maud_conveniences;
mod routes;
mod state;

async fn shutdown_signal(state: DirectoryState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    state.sensible_shutdown().await;
    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    match dotenv {
        Ok(path) => info!(?path, "loaded env file"),
        Err(e) if e.not_found() => debug!("no env file, using defaults"),
        Err(e) => warn!(?e, "unable to read env file"),
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let gateway = HttpStudentGateway::new(config.students_api_url())
        .expect("unable to create students gateway");
    let state = DirectoryState::new(Arc::new(gateway));

    let app = Router::new()
        .route("/", get(get_index))
        .route("/internal/directory", get(internal_get_directory))
        .route("/internal/directory/load", post(internal_post_load))
        .route("/internal/modal/add", post(internal_post_open_add))
        .route("/internal/modal/edit", post(internal_post_open_edit))
        .route("/internal/modal/close", post(internal_post_close))
        .route("/internal/draft", post(internal_post_draft))
        .route("/internal/submit", post(internal_post_submit))
        .route("/internal/students", delete(internal_delete_student))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let server_addr = config.server_addr();
    let listener = TcpListener::bind(server_addr)
        .await
        .expect("unable to listen on server ip");

    info!(?server_addr, students_api = config.students_api_url(), "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
