//! JWT Principal Propagation for Async Services
//!
//! Adapts the `jwt-security` token engine to tower-based pipelines, where a
//! request's future may be polled on a different worker thread after every
//! `.await`. Thread-locals are useless there, so the authenticated principal
//! travels with the request instead:
//!
//! - **Request extensions**: `req.principal()` via [`PrincipalExt`]
//! - **Task-local scope**: [`current_principal()`] anywhere inside the
//!   handler's future, without threading the request through
//!
//! ## Failure policy
//!
//! Missing, malformed, expired or forged credentials never fail the request.
//! It simply proceeds without a principal and the authorization layer decides
//! whether that is acceptable.
//!
//! ## Usage
//!
//! ```rust
//! use jwt_propagation::{current_principal, JwtAuthLayer};
//! use jwt_security::{BearerAuthenticator, Principal, TokenEngine};
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tower::{service_fn, Layer, ServiceExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = Arc::new(TokenEngine::from_secret("an-example-secret-of-32-characters!").unwrap());
//! let layer = JwtAuthLayer::new(BearerAuthenticator::new(engine.clone()));
//!
//! let service = layer.layer(service_fn(|_req: http::Request<()>| async {
//!     Ok::<_, Infallible>(current_principal().map(|p| p.username))
//! }));
//!
//! let token = engine.create_token(&Principal::new("alice", ["USER"]), "15m").unwrap();
//! let request = http::Request::builder()
//!     .header("Authorization", format!("Bearer {}", token))
//!     .body(())
//!     .unwrap();
//!
//! let user = service.oneshot(request).await.unwrap();
//! assert_eq!(user.as_deref(), Some("alice"));
//! # }
//! ```

mod context;
mod extensions;
mod layer;

pub use context::{current_principal, scope_principal};
pub use extensions::{PrincipalExt, Unauthenticated};
pub use layer::{JwtAuthLayer, JwtAuthService};
