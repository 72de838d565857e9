//! Static file serving.
//!
//! URL paths under a configured prefix map onto the public directory by
//! plain path joining. Before any read, both the public root and the
//! resolved file are canonicalized and the file must stay inside the root,
//! so `..` segments cannot escape it.

use crate::logger;
use crate::mime;
use crate::response::{self, HandlerResponse};
use std::path::Path;
use tokio::fs;

/// Does this URL path fall under one of the static prefixes?
#[must_use]
pub fn is_static_path(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Serve a static asset, or a 404 with the literal body `File not found`.
pub async fn serve(path: &str, static_root: &str) -> HandlerResponse {
    match load(static_root, path).await {
        Some((content, content_type)) => {
            response::build_static_file_response(content, content_type)
        }
        None => response::build_static_404_response(),
    }
}

/// Read a file under `static_root`, refusing paths that resolve outside it.
pub async fn load(static_root: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let relative = path.trim_start_matches('/');
    let file_path = Path::new(static_root).join(relative);

    let root = match Path::new(static_root).canonicalize() {
        Ok(root) => root,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root '{static_root}' not accessible: {e}"
            ));
            return None;
        }
    };

    // A missing file fails to canonicalize; that is the ordinary 404 case.
    let Ok(canonical) = file_path.canonicalize() else {
        return None;
    };
    if !canonical.starts_with(&root) {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return None;
    }
    if !canonical.is_file() {
        return None;
    }

    let content = match fs::read(&canonical).await {
        Ok(content) => content,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}
