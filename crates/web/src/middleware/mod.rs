//! Middleware and request extractors.

pub mod authz;
pub mod context;
pub mod session;

pub use authz::{Decision, Operation, Policy, Refusal, Requirement};
pub use context::RequestContext;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_key};
