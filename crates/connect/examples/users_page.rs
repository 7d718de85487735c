//! A server-rendered users page: lists users on GET, creates one from a form on POST and
//! redirects back, answers every other method with the not-found page.

use http::{Request, StatusCode};
use micro_connect::page::{PageProps, PageResult};
use micro_connect::{BoxError, Flow, HandlerResult, Router, ServerResponse, handler_fn, sync_handler_fn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

type Req = Request<String>;

#[derive(Debug, Clone, Serialize)]
struct User {
    id: usize,
    name: String,
    age: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct UserForm {
    name: String,
    age: u32,
}

#[derive(Debug, Default, Serialize)]
struct UsersProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PageProps for UsersProps {
    fn with_error(message: String) -> Self {
        Self { users: None, error: Some(message) }
    }
}

type Store = Arc<Mutex<Vec<User>>>;

fn users_page(store: &Store) -> Router<Req, ServerResponse, PageResult<UsersProps>> {
    let list_store = Arc::clone(store);
    let create_store = Arc::clone(store);

    let parse_form = handler_fn(|req: &mut Req, _res: &mut ServerResponse| {
        Box::pin(async move {
            let form: UserForm = serde_urlencoded::from_str(req.body())?;
            req.extensions_mut().insert(form);
            Ok::<_, BoxError>(Flow::Next)
        })
    });

    let create_user = sync_handler_fn(move |req: &mut Req, _res: &mut ServerResponse| -> HandlerResult<PageResult<UsersProps>> {
        let form = req.extensions().get::<UserForm>().ok_or("form was not parsed")?;
        if form.age > 100 {
            return Err(format!("{} is too old to sign up", form.name).into());
        }

        let mut users = create_store.lock().map_err(|e| e.to_string())?;
        let user = User { id: users.len() + 1, name: form.name.clone(), age: form.age };
        info!(id = user.id, name = %user.name, "user created");
        users.push(user);

        Ok(Flow::Done(PageResult::redirect("/gssp-users", StatusCode::SEE_OTHER)))
    });

    Router::new()
        .get(sync_handler_fn(move |_req: &mut Req, _res: &mut ServerResponse| {
            let users = list_store.lock().map_err(|e| e.to_string())?.clone();
            Ok(Flow::Done(PageResult::props(UsersProps { users: Some(users), error: None })))
        }))
        .post((parse_form, create_user))
        .all(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done(PageResult::not_found()))))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store: Store = Arc::default();
    let router = users_page(&store);

    let requests = [
        ("POST", "name=Jane&age=18"),
        ("POST", "name=Methuselah&age=969"),
        ("POST", "name=Bob"),
        ("GET", ""),
        ("DELETE", ""),
    ];

    for (method, body) in requests {
        let mut req = Request::builder().method(method).uri("/gssp-users").body(body.to_string())?;
        let result = router.run_page(&mut req, &mut ServerResponse::new()).await;
        info!(method, body, result = %serde_json::to_string(&result)?, "page rendered");
    }

    Ok(())
}
