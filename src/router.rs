//! Exact-match request router.
//!
//! Handlers are stored under their `(method, path)` pair. There is no
//! pattern matching, no path parameters, and no trailing-slash
//! normalization; the dispatcher always supplies `uri.path()`, so query
//! strings never reach the lookup.

use crate::app::AppContext;
use crate::request::RequestContext;
use crate::response::HandlerResponse;
use hyper::Method;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A registered route handler.
pub type Handler = Arc<
    dyn Fn(Arc<RequestContext>, Arc<AppContext>) -> BoxFuture<crate::Result<HandlerResponse>>
        + Send
        + Sync,
>;

#[derive(PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

#[derive(Default)]
pub struct Router {
    routes: HashMap<RouteKey, Handler>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a handler under the exact `(method, path)` key.
    ///
    /// A later registration for the same key silently replaces the earlier
    /// one.
    pub fn register(&mut self, method: Method, path: impl Into<String>, handler: Handler) {
        self.routes.insert(
            RouteKey {
                method,
                path: path.into(),
            },
            handler,
        );
    }

    /// Find the handler for an exact `(method, path)` pair.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&Handler> {
        self.routes.get(&RouteKey {
            method: method.clone(),
            path: path.to_string(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Box a plain async closure into a [`Handler`].
pub fn into_handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<HandlerResponse>> + Send + 'static,
{
    Arc::new(move |req, ctx| Box::pin(f(req, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;

    fn handler() -> Handler {
        into_handler(|_req, _ctx| async move { Ok(response::build_text_response("ok")) })
    }

    #[test]
    fn test_resolve_exact_pair() {
        let mut router = Router::new();
        let get_users = handler();
        router.register(Method::GET, "/users", Arc::clone(&get_users));

        let found = router.resolve(&Method::GET, "/users").unwrap();
        assert!(Arc::ptr_eq(found, &get_users));
    }

    #[test]
    fn test_resolve_misses_other_pairs() {
        let mut router = Router::new();
        router.register(Method::GET, "/users", handler());

        assert!(router.resolve(&Method::POST, "/users").is_none());
        assert!(router.resolve(&Method::GET, "/users/").is_none());
        assert!(router.resolve(&Method::GET, "/Users").is_none());
        assert!(router.resolve(&Method::GET, "/other").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut router = Router::new();
        let first = handler();
        let second = handler();

        router.register(Method::GET, "/users", Arc::clone(&first));
        router.register(Method::GET, "/users", Arc::clone(&second));

        assert_eq!(router.len(), 1);
        let found = router.resolve(&Method::GET, "/users").unwrap();
        assert!(Arc::ptr_eq(found, &second));
        assert!(!Arc::ptr_eq(found, &first));
    }

    #[test]
    fn test_same_path_different_methods_coexist() {
        let mut router = Router::new();
        let get = handler();
        let post = handler();

        router.register(Method::GET, "/users", Arc::clone(&get));
        router.register(Method::POST, "/users", Arc::clone(&post));

        assert_eq!(router.len(), 2);
        assert!(Arc::ptr_eq(router.resolve(&Method::GET, "/users").unwrap(), &get));
        assert!(Arc::ptr_eq(router.resolve(&Method::POST, "/users").unwrap(), &post));
    }
}
