//! JWT authentication for thread-per-request servers
//!
//! Adapts the `jwt-security` token engine to pipelines where a request runs
//! start to finish on one thread. The authenticated principal is published
//! into a thread-local [`SecurityContextHolder`] for the duration of the
//! request and removed again when the chain returns.
//!
//! ## Usage
//!
//! ```rust
//! use http::Request;
//! use jwt_filter::{Filter, JwtFilter, SecurityContextHolder};
//! use jwt_security::{BearerAuthenticator, Principal, TokenEngine};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(TokenEngine::from_secret("an-example-secret-of-32-characters!").unwrap());
//! let filter = JwtFilter::new(BearerAuthenticator::new(engine.clone()));
//!
//! let token = engine.create_token(&Principal::new("alice", ["USER"]), "15m").unwrap();
//! let request = Request::builder()
//!     .header("Authorization", format!("Bearer {}", token))
//!     .body(())
//!     .unwrap();
//!
//! let user = filter.do_filter(request, |_req: Request<()>| {
//!     SecurityContextHolder::authentication().map(|p| p.username)
//! });
//! assert_eq!(user.as_deref(), Some("alice"));
//! ```

mod context;
mod filter;

pub use context::SecurityContextHolder;
pub use filter::{Filter, FilterChain, FilterOutcome, JwtFilter, RequestAuthentication};
