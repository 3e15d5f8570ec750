//! Thread-scoped security context
//!
//! Holds the principal of the request currently running on this thread.
//! Only valid for thread-per-request servers; async code must use
//! `jwt-propagation` instead, since a task can resume on another thread.

use jwt_security::Principal;
use std::cell::RefCell;

thread_local! {
    static SECURITY_CONTEXT: RefCell<Option<Principal>> = const { RefCell::new(None) };
}

/// Access to the current thread's authenticated principal.
pub struct SecurityContextHolder;

impl SecurityContextHolder {
    /// Clone of the current principal, if any.
    pub fn authentication() -> Option<Principal> {
        SECURITY_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Borrow the current principal without cloning.
    ///
    /// `f` must not call back into `set_authentication` or `clear`.
    pub fn with_authentication<R>(f: impl FnOnce(Option<&Principal>) -> R) -> R {
        SECURITY_CONTEXT.with(|ctx| f(ctx.borrow().as_ref()))
    }

    pub fn is_authenticated() -> bool {
        SECURITY_CONTEXT.with(|ctx| ctx.borrow().is_some())
    }

    /// Install `principal`, returning whatever was there before.
    pub fn set_authentication(principal: Principal) -> Option<Principal> {
        SECURITY_CONTEXT.with(|ctx| ctx.borrow_mut().replace(principal))
    }

    pub fn clear() -> Option<Principal> {
        SECURITY_CONTEXT.with(|ctx| ctx.borrow_mut().take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        SecurityContextHolder::clear();
        assert!(!SecurityContextHolder::is_authenticated());

        let previous = SecurityContextHolder::set_authentication(Principal::new("alice", ["USER"]));
        assert!(previous.is_none());
        assert_eq!(
            SecurityContextHolder::authentication().map(|p| p.username),
            Some("alice".to_string())
        );
        assert!(SecurityContextHolder::with_authentication(|p| p.unwrap().has_authority("USER")));

        let cleared = SecurityContextHolder::clear();
        assert_eq!(cleared.map(|p| p.username), Some("alice".to_string()));
        assert!(SecurityContextHolder::authentication().is_none());
    }

    #[test]
    fn test_context_is_per_thread() {
        SecurityContextHolder::set_authentication(Principal::new("alice", ["USER"]));

        let seen_elsewhere = std::thread::spawn(SecurityContextHolder::is_authenticated)
            .join()
            .unwrap();

        assert!(!seen_elsewhere);
        assert!(SecurityContextHolder::is_authenticated());
        SecurityContextHolder::clear();
    }
}
