//! Console logging utilities.
//!
//! All output goes to stdout (info/access) or stderr (warnings/errors),
//! prefixed with a local timestamp.

use crate::config::AppConfig;
use chrono::Local;
use hyper::Method;
use std::net::SocketAddr;

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &AppConfig) {
    println!("======================================");
    println!("Riffle server started");
    println!("Listening on: http://{addr}");
    println!("Static root: {}", config.resources.static_root);
    println!("Views root: {}", config.resources.views_root);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[{}] [Connection] Accepted from: {peer_addr}", timestamp());
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[{}] [ERROR] Failed to serve connection: {err:?}", timestamp());
}

pub fn log_request(method: &Method, path: &str) {
    println!("[{}] [Request] {method} {path}", timestamp());
}

pub fn log_response(status: u16, bytes: u64) {
    println!("[{}] [Response] {status} ({bytes} bytes)", timestamp());
}

pub fn log_database_connected() {
    println!("[{}] [Database] Connected successfully", timestamp());
}

pub fn log_error(message: &str) {
    eprintln!("[{}] [ERROR] {message}", timestamp());
}

pub fn log_warning(message: &str) {
    eprintln!("[{}] [WARN] {message}", timestamp());
}

pub fn log_shutdown() {
    println!("\n[{}] Shutdown signal received, stopping server", timestamp());
}
