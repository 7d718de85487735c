//! Adapter for server-rendered pages.
//!
//! A page router's handlers do not write the response: they end the chain with a
//! [`PageResult`] that the rendering framework interprets (render with props, redirect, or
//! show the not-found page). [`Router::run_page`] always resolves to a `PageResult`, so no
//! error ever crosses the adapter boundary.
//!
//! ```
//! use http::{Request, StatusCode};
//! use micro_connect::page::{PageProps, PageResult};
//! use micro_connect::{sync_handler_fn, Flow, Router, ServerResponse};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Props {
//!     greeting: Option<String>,
//!     error: Option<String>,
//! }
//!
//! impl PageProps for Props {
//!     fn with_error(message: String) -> Self {
//!         Self { error: Some(message), ..Self::default() }
//!     }
//! }
//!
//! type Req = Request<()>;
//!
//! let router: Router<Req, ServerResponse, PageResult<Props>> = Router::new()
//!     .get(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| {
//!         Ok(Flow::Done(PageResult::props(Props { greeting: Some("hi".into()), error: None })))
//!     }))
//!     .all(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done(PageResult::NotFound))));
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut req = Request::delete("/").body(()).unwrap();
//! let result = router.run_page(&mut req, &mut ServerResponse::new()).await;
//! assert_eq!(result, PageResult::NotFound);
//! # });
//! ```

use crate::error::BoxError;
use crate::outcome::Outcome;
use crate::request::RouteRequest;
use crate::response::ResponseState;
use crate::router::Router;
use http::StatusCode;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::debug;

/// The closed set of declarative page results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult<P> {
    /// Render the page with these props.
    Props(P),
    /// Redirect instead of rendering.
    Redirect(Redirect),
    /// Render the not-found page.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    destination: String,
    status_code: StatusCode,
}

/// Props a page can be rendered with when dispatch did not produce a result of its own.
pub trait PageProps: Default {
    /// Props carrying the message of a failed dispatch.
    fn with_error(message: String) -> Self;
}

impl<P> PageResult<P> {
    pub fn props(props: P) -> Self {
        Self::Props(props)
    }

    pub fn redirect(destination: impl Into<String>, status_code: StatusCode) -> Self {
        Self::Redirect(Redirect::new(destination, status_code))
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn as_props(&self) -> Option<&P> {
        match self {
            Self::Props(props) => Some(props),
            Self::Redirect(_) | Self::NotFound => None,
        }
    }
}

impl Redirect {
    pub fn new(destination: impl Into<String>, status_code: StatusCode) -> Self {
        Self { destination: destination.into(), status_code }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

/// Serializes as `{"props": ..}`, `{"redirect": {"destination": .., "statusCode": ..}}` or
/// `{"notFound": true}`.
impl<P: Serialize> Serialize for PageResult<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Props(props) => map.serialize_entry("props", props)?,
            Self::Redirect(redirect) => map.serialize_entry("redirect", redirect)?,
            Self::NotFound => map.serialize_entry("notFound", &true)?,
        }
        map.end()
    }
}

impl Serialize for Redirect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Redirect", 2)?;
        state.serialize_field("destination", &self.destination)?;
        state.serialize_field("statusCode", &self.status_code.as_u16())?;
        state.end()
    }
}

impl<Req, Res, P> Router<Req, Res, PageResult<P>>
where
    Req: RouteRequest,
    Res: ResponseState,
    P: PageProps + Send,
{
    /// Dispatches a page request and resolves it to a [`PageResult`].
    ///
    /// - a handler's result is returned as is,
    /// - no result ([`Outcome::NotFound`]) becomes [`PageResult::NotFound`],
    /// - a response written directly ([`Outcome::Sent`]) becomes default props,
    /// - a failure, absorbed by the default error handler or raised by a custom one, becomes
    ///   props built by [`PageProps::with_error`] from the error message.
    pub async fn run_page(&self, req: &mut Req, res: &mut Res) -> PageResult<P> {
        let result: Result<Outcome<PageResult<P>>, BoxError> = self.run(req, res).await;
        match result {
            Ok(Outcome::Done(page)) => page,
            Ok(Outcome::NotFound) => PageResult::NotFound,
            Ok(Outcome::Sent) => PageResult::Props(P::default()),
            Ok(Outcome::Failed(err)) => PageResult::Props(P::with_error(err.to_string())),
            Err(err) => {
                debug!(cause = %err, "error handler failed, rendering error props");
                PageResult::Props(P::with_error(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageProps, PageResult};
    use crate::error::{BoxError, RouteError};
    use crate::handler::{handler_fn, sync_error_handler_fn, sync_handler_fn, Flow, Handler, HandlerResult};
    use crate::outcome::Outcome;
    use crate::response::ServerResponse;
    use crate::router::Router;
    use http::{Request, StatusCode};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct User {
        id: String,
        name: String,
        age: u32,
    }

    #[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
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

    type Req = Request<String>;
    type Store = Arc<Mutex<Vec<User>>>;
    type PageRouter = Router<Req, ServerResponse, PageResult<UsersProps>>;

    #[derive(Debug, Clone)]
    struct FormBody(HashMap<String, String>);

    fn parse_form() -> impl Handler<Req, ServerResponse, PageResult<UsersProps>> {
        handler_fn(|req: &mut Req, _res: &mut ServerResponse| {
            Box::pin(async move {
                let form: HashMap<String, String> = serde_urlencoded::from_str(req.body())?;
                req.extensions_mut().insert(FormBody(form));
                Ok::<_, BoxError>(Flow::<PageResult<UsersProps>>::Next)
            })
        })
    }

    fn users_router(store: &Store) -> PageRouter {
        let list_store = Arc::clone(store);
        let create_store = Arc::clone(store);

        Router::new()
            .get(sync_handler_fn(move |_req: &mut Req, _res: &mut ServerResponse| {
                let users = list_store.lock().map_err(|e| e.to_string())?.clone();
                Ok(Flow::Done(PageResult::props(UsersProps { users: Some(users), error: None })))
            }))
            .post((
                parse_form(),
                sync_handler_fn(move |req: &mut Req, _res: &mut ServerResponse| -> HandlerResult<PageResult<UsersProps>> {
                    let form = req.extensions().get::<FormBody>().ok_or("missing form body")?;
                    let name = form.0.get("name").filter(|name| !name.is_empty()).ok_or("name is required")?;
                    let age: u32 = form.0.get("age").ok_or("age is required")?.parse()?;
                    if age > 100 {
                        return Err("age must be at most 100".into());
                    }

                    let mut users = create_store.lock().map_err(|e| e.to_string())?;
                    let id = format!("u{}", users.len() + 1);
                    users.push(User { id, name: name.clone(), age });
                    Ok(Flow::Done(PageResult::redirect("/gssp-users", StatusCode::SEE_OTHER)))
                }),
            ))
            .all(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done(PageResult::NotFound))))
    }

    fn request(method: &str, body: &str) -> Req {
        Request::builder().method(method).uri("/gssp-users").body(body.to_string()).unwrap()
    }

    #[tokio::test]
    async fn get_renders_users() {
        let store: Store = Arc::new(Mutex::new(vec![User { id: "u1".into(), name: "Ada".into(), age: 36 }]));
        let router = users_router(&store);

        let result = router.run_page(&mut request("GET", ""), &mut ServerResponse::new()).await;
        let users = result.as_props().and_then(|props| props.users.clone()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ada");
    }

    #[tokio::test]
    async fn post_creates_user_and_redirects() {
        let store: Store = Arc::default();
        let router = users_router(&store);

        let result = router.run_page(&mut request("POST", "name=Jane&age=18"), &mut ServerResponse::new()).await;
        assert_eq!(result, PageResult::redirect("/gssp-users", StatusCode::SEE_OTHER));
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({
            "redirect": { "destination": "/gssp-users", "statusCode": 303 }
        }));

        let users = store.lock().unwrap().clone();
        assert_eq!(users, [User { id: "u1".into(), name: "Jane".into(), age: 18 }]);
    }

    #[tokio::test]
    async fn other_methods_are_not_found() {
        let router = users_router(&Arc::default());

        let result = router.run_page(&mut request("DELETE", ""), &mut ServerResponse::new()).await;
        assert_eq!(result, PageResult::NotFound);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "notFound": true }));
    }

    #[tokio::test]
    async fn validation_failure_becomes_error_props() {
        let store: Store = Arc::default();
        let router = users_router(&store);

        let mut res = ServerResponse::new();
        let result = router.run_page(&mut request("POST", "name=Jane&age=140"), &mut res).await;

        assert_eq!(result, PageResult::Props(UsersProps::with_error("age must be at most 100".into())));
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "props": { "error": "age must be at most 100" } }));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_error_handler_still_resolves_to_props() {
        let router = users_router(&Arc::default()).on_error(sync_error_handler_fn(
            |err: RouteError, _req: &mut Req, _res: &mut ServerResponse| -> Result<Outcome<PageResult<UsersProps>>, BoxError> {
                Err(format!("could not render error page: {err}").into())
            },
        ));

        let result = router.run_page(&mut request("POST", "age=1"), &mut ServerResponse::new()).await;
        assert_eq!(result, PageResult::Props(UsersProps::with_error("could not render error page: name is required".into())));
    }

    #[tokio::test]
    async fn written_response_becomes_default_props() {
        let router: PageRouter = Router::new().get(sync_handler_fn(|_req: &mut Req, res: &mut ServerResponse| {
            res.text("streamed");
            Ok(Flow::<PageResult<UsersProps>>::Next)
        }));

        let result = router.run_page(&mut request("GET", ""), &mut ServerResponse::new()).await;
        assert_eq!(result, PageResult::Props(UsersProps::default()));
    }

    #[test]
    fn props_serialize_under_props_key() {
        let result = PageResult::props(UsersProps { users: Some(Vec::new()), error: None });
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "props": { "users": [] } }));
    }
}
