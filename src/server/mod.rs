//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │       POST /api/login   /api/patch   /api/getThumbnail          │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────┐  ┌───────────┐  │
//! │  │  handlers   │  │    auth     │  │ payload  │  │  routes   │  │
//! │  │ (requests)  │  │   (gate)    │  │ (bodies) │  │ (router)  │  │
//! │  └─────────────┘  └─────────────┘  └──────────┘  └───────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod payload;
pub mod routes;

pub use auth::{
    auth_middleware, extract_token, AuthError, AuthGate, BearerToken, PATCH_REJECTION,
    THUMBNAIL_REJECTION,
};
pub use handlers::{
    health_handler, login_handler, patch_handler, thumbnail_handler, AppState, HealthResponse,
    LoginResponse, PatchResponse,
};
pub use payload::{parse_body, Payload};
pub use routes::{create_router, RouterConfig};
