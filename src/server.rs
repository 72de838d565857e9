//! Listener setup, accept loop, and request dispatch.
//!
//! One spawned task per connection, HTTP/1.1 with keep-alive. Dispatch
//! decides between static-file resolution and routed handling; every
//! request ends in exactly one response, and a failing handler never takes
//! the loop down.

use crate::app::AppState;
use crate::logger;
use crate::middleware::Flow;
use crate::request::RequestContext;
use crate::response::{self, HandlerResponse};
use crate::static_files;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Accept connections until a shutdown signal arrives.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> crate::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}

/// Serve one connection on its own task.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        if state.config.logging.access_log {
            logger::log_connection_accepted(&peer_addr);
        }

        let io = TokioIo::new(stream);
        let service_state = Arc::clone(&state);
        let mut builder = http1::Builder::new();
        builder.keep_alive(true);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| dispatch(req, Arc::clone(&service_state), Some(peer_addr))),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}

/// Route a single request to its response.
///
/// Control flow: static prefix first (even when a route would also match),
/// then the middleware chain, then exact route resolution. Any error from
/// middleware or the handler maps to a fixed 500; a missing route maps to
/// 404.
pub async fn dispatch<B>(
    req: hyper::Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> std::result::Result<HandlerResponse, Infallible>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: std::fmt::Display + Send,
{
    let access_log = state.config.logging.access_log;
    if access_log {
        logger::log_request(req.method(), req.uri().path());
    }

    // 1. Static assets take priority over routes.
    let path = req.uri().path().to_owned();
    if static_files::is_static_path(&path, &state.config.resources.static_prefixes) {
        let response = static_files::serve(&path, &state.config.resources.static_root).await;
        return finish(response, access_log);
    }

    // 2. Collect the body into an owned request context.
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return finish(response::build_500_response(), access_log);
        }
    };
    let request = Arc::new(RequestContext {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
        remote_addr,
    });

    // 3. Middleware runs before route resolution, so it also observes
    //    requests that will 404.
    match state.middleware.run(&request, &state.context).await {
        Ok(Flow::Continue) => {}
        Ok(Flow::Halt(response)) => return finish(response, access_log),
        Err(e) => {
            logger::log_error(&format!("Middleware error: {e}"));
            return finish(response::build_500_response(), access_log);
        }
    }

    // 4. Exact route lookup; absence is a 404.
    let Some(handler) = state.router.resolve(&request.method, request.path()) else {
        return finish(response::build_404_response(), access_log);
    };

    // 5. Run the handler; any error becomes a single 500.
    match handler.as_ref()(Arc::clone(&request), Arc::clone(&state.context)).await {
        Ok(response) => finish(response, access_log),
        Err(e) => {
            logger::log_error(&format!("Error handling request: {e}"));
            finish(response::build_500_response(), access_log)
        }
    }
}

fn finish(
    response: HandlerResponse,
    access_log: bool,
) -> std::result::Result<HandlerResponse, Infallible> {
    if access_log {
        let bytes = response.body().size_hint().exact().unwrap_or(0);
        logger::log_response(response.status().as_u16(), bytes);
    }
    Ok(response)
}

/// Create a `TcpListener` with SO_REUSEADDR and SO_REUSEPORT enabled, so a
/// replacement process can bind while an old listener drains.
pub fn create_reusable_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
