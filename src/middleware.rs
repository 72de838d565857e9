//! Linear middleware chain.
//!
//! Every registered middleware runs in registration order for each
//! non-static request, before route resolution. A middleware signals
//! [`Flow::Continue`] to pass control on, or [`Flow::Halt`] to stop the
//! chain and answer the request itself; errors propagate like handler
//! errors and become a 500.

use crate::app::AppContext;
use crate::request::RequestContext;
use crate::response::HandlerResponse;
use crate::router::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Continuation signal returned by each middleware.
#[derive(Debug)]
pub enum Flow {
    /// Proceed to the next middleware, then the route handler.
    Continue,
    /// Stop the chain; the carried response is written as-is and the route
    /// handler never runs.
    Halt(HandlerResponse),
}

pub type Middleware = Arc<
    dyn Fn(Arc<RequestContext>, Arc<AppContext>) -> BoxFuture<crate::Result<Flow>> + Send + Sync,
>;

#[derive(Default)]
pub struct MiddlewareChain {
    entries: Vec<Middleware>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; insertion order is execution order.
    pub fn register(&mut self, middleware: Middleware) {
        self.entries.push(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the chain in registration order.
    ///
    /// Returns the first `Halt`, the first error, or `Continue` once every
    /// middleware has passed.
    pub async fn run(
        &self,
        req: &Arc<RequestContext>,
        ctx: &Arc<AppContext>,
    ) -> crate::Result<Flow> {
        for middleware in &self.entries {
            let flow = middleware.as_ref()(Arc::clone(req), Arc::clone(ctx)).await?;
            if let Flow::Halt(response) = flow {
                return Ok(Flow::Halt(response));
            }
        }
        Ok(Flow::Continue)
    }
}

/// Box a plain async closure into a [`Middleware`].
pub fn into_middleware<F, Fut>(f: F) -> Middleware
where
    F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<Flow>> + Send + 'static,
{
    Arc::new(move |req, ctx| Box::pin(f(req, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::Database;
    use crate::error::Error;
    use crate::response;
    use crate::template::TemplateEngine;
    use hyper::body::Bytes;
    use hyper::header::HeaderMap;
    use hyper::{Method, Uri};
    use std::sync::Mutex;

    fn test_request() -> Arc<RequestContext> {
        Arc::new(RequestContext {
            method: Method::GET,
            uri: Uri::from_static("/"),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        })
    }

    fn test_context() -> Arc<AppContext> {
        let config = AppConfig::default();
        let db = Database::connect_lazy(&config.database);
        let templates = TemplateEngine::new(&config.resources.views_root);
        Arc::new(AppContext {
            config,
            db,
            templates,
        })
    }

    fn recording(order: &Arc<Mutex<Vec<u32>>>, id: u32) -> Middleware {
        let order = Arc::clone(order);
        into_middleware(move |_req, _ctx| {
            let order = Arc::clone(&order);
            async move {
                order.lock().unwrap().push(id);
                Ok(Flow::Continue)
            }
        })
    }

    #[tokio::test]
    async fn test_runs_in_registration_order_exactly_once() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(recording(&order, 1));
        chain.register(recording(&order, 2));
        chain.register(recording(&order, 3));

        let flow = chain.run(&test_request(), &test_context()).await.unwrap();
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_halt_skips_remaining_middleware() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(recording(&order, 1));
        chain.register(into_middleware(|_req, _ctx| async move {
            Ok(Flow::Halt(response::build_text_response("halted")))
        }));
        chain.register(recording(&order, 3));

        let flow = chain.run(&test_request(), &test_context()).await.unwrap();
        assert!(matches!(flow, Flow::Halt(_)));
        assert_eq!(*order.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_error_stops_chain() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(into_middleware(|_req, _ctx| async move {
            Err(Error::other("middleware failure"))
        }));
        chain.register(recording(&order, 2));

        assert!(chain.run(&test_request(), &test_context()).await.is_err());
        assert!(order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_chain_continues() {
        let chain = MiddlewareChain::new();
        let flow = chain.run(&test_request(), &test_context()).await.unwrap();
        assert!(matches!(flow, Flow::Continue));
    }
}
