//! HTTP gateway exposing the codec as JSON endpoints

pub mod discovery;
pub mod handlers;
pub mod responses;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
