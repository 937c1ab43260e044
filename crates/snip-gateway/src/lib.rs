//! HTTP surface for the snip shortener.
//!
//! Thin axum layer over a [`Shortener`](snip_shortener::Shortener): request
//! parsing, JSON shaping, status mapping and the redirect route.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
