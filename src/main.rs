//! Sample application: a few pages, a JSON users API, and a ping
//! short-circuit, exercising every framework piece.

use riffle::{logger, response, App, AppConfig, Flow, SqlValue, TemplateData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, sqlx::FromRow)]
struct User {
    id: i64,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

fn main() -> riffle::Result<()> {
    let cfg = AppConfig::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(run(cfg))
}

async fn run(cfg: AppConfig) -> riffle::Result<()> {
    let mut app = App::new(cfg);

    // The app stays up without a database; /users answers 500 until one is
    // reachable.
    if let Err(e) = app.connect().await {
        logger::log_warning(&format!("Database unavailable at startup: {e}"));
    }

    // Request logging.
    app.wrap(|req, _ctx| async move {
        logger::log_request(&req.method, req.path());
        Ok(Flow::Continue)
    });

    // Liveness probe answered before route resolution.
    app.wrap(|req, _ctx| async move {
        if req.path() == "/ping" {
            return Ok(Flow::Halt(response::build_text_response("pong")));
        }
        Ok(Flow::Continue)
    });

    app.get("/", |_req, ctx| async move {
        let mut data = TemplateData::new();
        data.set("title", "Welcome to Riffle")
            .set("message", "A small web framework written in Rust");
        let html = ctx.templates.render("index", &data).await?;
        Ok(response::build_html_response(html))
    });

    app.get("/features", |_req, ctx| async move {
        let mut data = TemplateData::new();
        data.set("title", "Features");
        let html = ctx.templates.render("features", &data).await?;
        Ok(response::build_html_response(html))
    });

    app.get("/users", |_req, ctx| async move {
        let users: Vec<User> = ctx
            .db
            .fetch_as("SELECT id, name, email FROM users", &[])
            .await?;
        Ok(response::build_json_response(&users))
    });

    app.post("/users", |req, ctx| async move {
        let new_user: NewUser = req.json()?;
        let result = ctx
            .db
            .execute(
                "INSERT INTO users (name, email) VALUES (?, ?)",
                &[
                    SqlValue::text(&new_user.name),
                    SqlValue::text(&new_user.email),
                ],
            )
            .await?;

        Ok(response::build_json_response(&serde_json::json!({
            "id": result.last_insert_id(),
            "name": new_user.name,
            "email": new_user.email,
        })))
    });

    app.listen().await
}
