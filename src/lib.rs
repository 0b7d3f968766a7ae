//! Toolbox Server Library
//!
//! Server side of a multi-tool web app. The binary in main.rs wires the
//! configuration and storage backends; tests build the router directly.
//!
//! # Modules
//!
//! - `imaging`: image compression, icon sets, dominant colours
//! - `pdf`: conversion, merge, split and editing of PDF documents
//! - `minify`: CSS and HTML minification
//! - `tools`: stateless text and data utilities
//! - `feedback`: feedback queue and spreadsheet sync

pub mod archive;
pub mod config;
pub mod error;
pub mod feedback;
pub mod imaging;
pub mod minify;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod storage;
pub mod temp_files;
pub mod tools;
pub mod upload;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Files per request the framework body limit leaves room for
const FILES_PER_REQUEST: usize = 8;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The per-file cap is enforced while streaming; this is the request ceiling
    let body_limit = state.max_upload().saturating_mul(FILES_PER_REQUEST);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::images::router())
        .merge(routes::minify::router())
        .merge(routes::builds::router())
        .merge(routes::blobs::router())
        .merge(routes::download::router())
        .merge(routes::feedback::router())
        .merge(routes::cron::router())
        .merge(routes::pdf::router())
        .merge(routes::tools::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
