//! Route guard — gates protected views on session state.
//!
//! A pure decision table over the session store's `(is_loading,
//! is_authenticated)` pair. The guard holds no state of its own; history
//! replacement on redirect is the navigator's concern.

/// The guard's verdict for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Restoration still in flight: render a neutral waiting state and make
    /// no navigation decision.
    Waiting,
    /// Not authenticated: redirect to the public entry view, replacing
    /// history so back-navigation cannot loop into the protected area.
    RedirectToLogin,
    /// Authenticated: render the protected view tree unchanged.
    RenderProtected,
}

/// Decide whether a protected view may render.
pub fn evaluate(is_loading: bool, is_authenticated: bool) -> RouteDecision {
    if is_loading {
        RouteDecision::Waiting
    } else if !is_authenticated {
        RouteDecision::RedirectToLogin
    } else {
        RouteDecision::RenderProtected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_is_total() {
        // While loading, authentication is irrelevant.
        assert_eq!(evaluate(true, false), RouteDecision::Waiting);
        assert_eq!(evaluate(true, true), RouteDecision::Waiting);
        // Once loaded, authentication decides.
        assert_eq!(evaluate(false, false), RouteDecision::RedirectToLogin);
        assert_eq!(evaluate(false, true), RouteDecision::RenderProtected);
    }
}
