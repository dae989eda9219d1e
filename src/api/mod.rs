//! HTTP boundary: `GET /`, `GET /health` and `POST /query`

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use server::build_app;
pub use server::build_state;
pub use server::serve_api;
