//! Background removal service layer.
//!
//! Sits between the HTTP handlers and the decode/extract building blocks:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             RemovalService              │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │decode_payload│─►│   Foreground    │  │
//! │  │ (base64 →    │  │   Extractor     │  │
//! │  │  validated)  │  │ (raw → PNG)     │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```

mod service;

pub use service::{RemovalRequest, RemovalResponse, RemovalService, DEFAULT_SIZE_HINT};
