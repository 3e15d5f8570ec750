//! Continuation-scoped security context
//!
//! The principal is bound to the request's future with a tokio task-local,
//! so it stays visible however many times the future is suspended and
//! resumed, on whichever worker thread. It is not inherited by tasks spawned
//! with `tokio::spawn`; pass the principal explicitly to those.

use jwt_security::Principal;
use std::future::Future;
use tokio::task::futures::TaskLocalFuture;

tokio::task_local! {
    static AUTHENTICATION: Principal;
}

/// Principal of the request whose future is currently being polled.
pub fn current_principal() -> Option<Principal> {
    AUTHENTICATION.try_with(Principal::clone).ok()
}

/// Run `future` with `principal` as its security context.
pub fn scope_principal<F>(principal: Principal, future: F) -> TaskLocalFuture<Principal, F>
where
    F: Future,
{
    AUTHENTICATION.scope(principal, future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_principal_outside_scope() {
        assert!(current_principal().is_none());
    }

    #[tokio::test]
    async fn test_scope_survives_suspension() {
        let seen = scope_principal(Principal::new("alice", ["USER"]), async {
            tokio::task::yield_now().await;
            current_principal()
        })
        .await;

        assert_eq!(seen.map(|p| p.username), Some("alice".to_string()));
        assert!(current_principal().is_none());
    }

    #[tokio::test]
    async fn test_nested_scope_shadows_outer() {
        let outer = Principal::new("outer", ["A"]);
        let inner = Principal::new("inner", ["B"]);

        let (in_inner, after_inner) = scope_principal(outer, async move {
            let in_inner = scope_principal(inner, async { current_principal() }).await;
            (in_inner, current_principal())
        })
        .await;

        assert_eq!(in_inner.map(|p| p.username), Some("inner".to_string()));
        assert_eq!(after_inner.map(|p| p.username), Some("outer".to_string()));
    }
}
