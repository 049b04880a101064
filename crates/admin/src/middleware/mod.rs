//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions) - added in `main`
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. [`RequireAdmin`] route layer on `/api/*`

pub mod auth;

pub use auth::RequireAdmin;
