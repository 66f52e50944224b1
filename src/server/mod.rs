//! HTTP server layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              POST /removebg        GET /health                  │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (X-Api-Key) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{api_key_middleware, ApiKeyAuth, API_KEY_HEADER};
pub use handlers::{
    health_handler, remove_bg_handler, AppState, ErrorResponse, HealthResponse, RemoveBgForm,
    EXTRACTION_FAILED_LABEL, UNAUTHORIZED_DETAIL,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_SIZE};
