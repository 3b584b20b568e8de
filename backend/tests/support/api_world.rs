//! Shared world for HTTP behaviour tests.
//!
//! Each world owns an in-memory [`TestBackend`] and an actix system. Steps
//! run synchronously; every request builds a fresh service over the same
//! shared state, so records persist across steps.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use actix_web::http::{Method, header};
use actix_web::test;
use greenleaf::domain::TRACE_ID_HEADER;
use greenleaf::test_support::TestBackend;
use serde_json::Value;

/// Outcome of one request.
#[derive(Debug, Clone)]
pub(crate) struct ApiResponse {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

/// Request issued by a step.
pub(crate) struct ApiRequest<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) bearer: Option<String>,
    pub(crate) payload: Option<Value>,
}

impl<'a> ApiRequest<'a> {
    pub(crate) fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            bearer: None,
            payload: None,
        }
    }

    pub(crate) fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub(crate) fn json(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

pub(crate) struct ApiWorld {
    system: actix_rt::SystemRunner,
    backend: TestBackend,
    /// Token pair bodies keyed by account email.
    pub(crate) sessions: HashMap<String, Value>,
    /// Plant identifiers keyed by common name.
    pub(crate) plants: HashMap<String, i64>,
    pub(crate) last_plant: Option<Value>,
    pub(crate) last_observation_id: Option<i64>,
    pub(crate) last: Option<ApiResponse>,
}

pub(crate) type SharedWorld = Rc<RefCell<ApiWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

pub(crate) fn world() -> WorldFixture {
    let world = ApiWorld {
        system: actix_rt::System::new(),
        backend: TestBackend::new().expect("test backend"),
        sessions: HashMap::new(),
        plants: HashMap::new(),
        last_plant: None,
        last_observation_id: None,
        last: None,
    };
    WorldFixture {
        world: Rc::new(RefCell::new(world)),
    }
}

/// Send `request` and record the response as the world's last one.
pub(crate) fn send(world: &SharedWorld, request: ApiRequest<'_>) -> ApiResponse {
    let response = {
        let ctx = world.borrow();
        let app = ctx.backend.app();
        let ApiRequest {
            method,
            path,
            bearer,
            payload,
        } = request;
        // The future never touches the world, so holding the borrow is safe.
        ctx.system.block_on(async move {
            let service = test::init_service(app).await;
            let mut req = test::TestRequest::default().method(method).uri(path);
            if let Some(token) = bearer {
                req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
            }
            if let Some(payload) = payload {
                req = req.set_json(payload);
            }
            let res = test::call_service(&service, req.to_request()).await;
            let status = res.status().as_u16();
            let trace_id = res
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = test::read_body(res).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON response body")
            };
            ApiResponse {
                status,
                trace_id,
                body,
            }
        })
    };
    world.borrow_mut().last = Some(response.clone());
    response
}

/// Field `key` of the token pair stored for `email`.
pub(crate) fn session_token(world: &SharedWorld, email: &str, key: &str) -> String {
    world
        .borrow()
        .sessions
        .get(email)
        .and_then(|pair| pair.get(key))
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("no {key} token for {email}"))
        .to_owned()
}

pub(crate) fn last_response(world: &SharedWorld) -> ApiResponse {
    world.borrow().last.clone().expect("a request was sent")
}
