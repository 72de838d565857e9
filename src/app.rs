//! Application builder and shared state.
//!
//! [`App`] collects routes, middleware, and configuration, then
//! [`App::listen`] turns them into the immutable [`AppState`] the server
//! loop shares across connections. Handlers never see `App`; they receive
//! the [`AppContext`], which owns the database pool and template engine.

use crate::config::AppConfig;
use crate::db::Database;
use crate::error::Result;
use crate::logger;
use crate::middleware::{self, Flow, MiddlewareChain};
use crate::request::RequestContext;
use crate::response::HandlerResponse;
use crate::router::{self, Router};
use crate::server;
use crate::template::TemplateEngine;
use hyper::Method;
use std::future::Future;
use std::sync::Arc;

/// Per-application resources passed to every middleware and handler.
pub struct AppContext {
    pub config: AppConfig,
    pub db: Database,
    pub templates: TemplateEngine,
}

/// Immutable registration state shared by the server loop.
pub struct AppState {
    pub config: AppConfig,
    pub router: Router,
    pub middleware: MiddlewareChain,
    pub context: Arc<AppContext>,
}

/// The application under construction.
pub struct App {
    config: AppConfig,
    router: Router,
    middleware: MiddlewareChain,
    db: Database,
    templates: TemplateEngine,
}

impl App {
    /// Build an application from its configuration.
    ///
    /// The database pool is created lazily; no connection is made until the
    /// first query, or until [`App::connect`] is called.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let db = Database::connect_lazy(&config.database);
        let templates = TemplateEngine::new(&config.resources.views_root);
        Self {
            config,
            router: Router::new(),
            middleware: MiddlewareChain::new(),
            db,
            templates,
        }
    }

    /// Verify database connectivity up front.
    ///
    /// Optional: queries issued without this call connect on first use and
    /// surface failures per request.
    pub async fn connect(&self) -> Result<()> {
        self.db.ping().await?;
        logger::log_database_connected();
        Ok(())
    }

    /// Register a handler for an arbitrary method and exact path.
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        self.router
            .register(method, path, router::into_handler(handler));
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        self.route(Method::GET, path, handler);
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        self.route(Method::POST, path, handler);
    }

    pub fn put<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        self.route(Method::PUT, path, handler);
    }

    pub fn delete<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        self.route(Method::DELETE, path, handler);
    }

    /// Append a middleware; insertion order is execution order.
    pub fn wrap<F, Fut>(&mut self, middleware: F)
    where
        F: Fn(Arc<RequestContext>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Flow>> + Send + 'static,
    {
        self.middleware
            .register(middleware::into_middleware(middleware));
    }

    /// Finalize registrations into the state the dispatcher consumes.
    #[must_use]
    pub fn into_state(self) -> Arc<AppState> {
        let context = Arc::new(AppContext {
            config: self.config.clone(),
            db: self.db,
            templates: self.templates,
        });
        Arc::new(AppState {
            config: self.config,
            router: self.router,
            middleware: self.middleware,
            context,
        })
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn listen(self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let state = self.into_state();
        let listener = server::create_reusable_listener(addr)?;
        logger::log_server_start(&addr, &state.config);
        server::run(listener, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;

    #[tokio::test]
    async fn test_registration_populates_router_and_chain() {
        let mut app = App::new(AppConfig::default());
        app.get("/", |_req, _ctx| async move {
            Ok(response::build_text_response("home"))
        });
        app.post("/users", |_req, _ctx| async move {
            Ok(response::build_text_response("created"))
        });
        app.wrap(|_req, _ctx| async move { Ok(Flow::Continue) });

        let state = app.into_state();
        assert_eq!(state.router.len(), 2);
        assert_eq!(state.middleware.len(), 1);
        assert!(state.router.resolve(&Method::GET, "/").is_some());
        assert!(state.router.resolve(&Method::POST, "/users").is_some());
        assert!(state.router.resolve(&Method::PUT, "/users").is_none());
    }
}
