//! HTTP server over the download queue: router, handlers and shared state.

pub mod api;
pub mod state;
