//! Riffle, a small web framework.
//!
//! The pieces are deliberately thin: an exact-match router, a linear
//! middleware chain with an explicit continue/halt signal, static-file
//! serving with traversal protection, a `{{key}}` string-template renderer
//! that escapes by default, and a MySQL gateway over a connection pool. The
//! dispatcher ties them together on hyper's HTTP/1.1 server.
//!
//! ```no_run
//! use riffle::{App, AppConfig, response};
//!
//! fn main() -> riffle::Result<()> {
//!     let runtime = tokio::runtime::Runtime::new()?;
//!     runtime.block_on(async {
//!         let mut app = App::new(AppConfig::default());
//!         app.get("/", |_req, _ctx| async move {
//!             Ok(response::build_text_response("hello"))
//!         });
//!         app.listen().await
//!     })
//! }
//! ```

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod mime;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod static_files;
pub mod template;

pub use app::{App, AppContext, AppState};
pub use config::AppConfig;
pub use db::{Database, SqlValue};
pub use error::{Error, Result};
pub use middleware::Flow;
pub use request::RequestContext;
pub use response::HandlerResponse;
pub use template::{TemplateData, TemplateEngine};
