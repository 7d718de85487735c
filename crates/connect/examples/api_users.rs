//! A JSON users API behind an [`ApiHandler`](micro_connect::api::ApiHandler), composed from a
//! logging middleware router and a users router mounted under `/api/users`.

use bytes::Bytes;
use http::{Method, Request};
use http_body_util::BodyExt;
use micro_connect::api::HandlerOptions;
use micro_connect::{BoxError, Flow, HandlerResult, Router, ServerResponse, sync_handler_fn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

type Req = Request<Bytes>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    name: String,
    age: u32,
}

fn users_api(store: &Arc<Mutex<Vec<User>>>) -> Router<Req, ServerResponse> {
    let list_store = Arc::clone(store);
    let create_store = Arc::clone(store);

    Router::new()
        .get(sync_handler_fn(move |_req: &mut Req, res: &mut ServerResponse| -> HandlerResult<()> {
            let users = list_store.lock().map_err(|e| e.to_string())?;
            res.json(&*users)?;
            Ok(Flow::Done(()))
        }))
        .post(sync_handler_fn(move |req: &mut Req, res: &mut ServerResponse| -> HandlerResult<()> {
            let user: User = serde_json::from_slice(req.body())?;
            res.json(&user)?;
            create_store.lock().map_err(|e| e.to_string())?.push(user);
            Ok(Flow::Done(()))
        }))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let access_log: Router<Req, ServerResponse> = Router::new().use_handlers(sync_handler_fn(|req: &mut Req, _res: &mut ServerResponse| {
        info!(method = %req.method(), path = req.uri().path(), "request");
        Ok(Flow::Next)
    }));

    let store = Arc::default();
    let handler = Router::new().mount(&access_log).mount_at("/api/users", &users_api(&store)).handler(HandlerOptions::default());

    let requests = [
        (Method::POST, "/api/users", r#"{"name":"Jane","age":18}"#),
        (Method::POST, "/api/users", r#"{"name":"#),
        (Method::GET, "/api/users", ""),
        (Method::PUT, "/api/users", ""),
        (Method::GET, "/api/teams", ""),
    ];

    for (method, path, body) in requests {
        let req = Request::builder().method(method).uri(path).body(Bytes::from_static(body.as_bytes()))?;
        let response = handler.call(req).await;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        info!(%status, body = %String::from_utf8_lossy(&body), "response");
    }

    Ok(())
}
