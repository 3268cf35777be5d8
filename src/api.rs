use std::rc::Rc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::AppConfig;
use crate::session::{Session, UserProfile};

pub const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Per-call options. Headers given here win over the pipeline defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Adds the header unless the caller already set one with that name.
    pub fn set_default_header(&mut self, name: &str, value: String) {
        if self.header(name).is_none() {
            self.headers.push((name.to_string(), value));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    Build(String),
    #[error("network request failed: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// The network boundary. The browser build uses `gloo-net`.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// One step of the outgoing request pipeline.
pub trait Interceptor {
    fn intercept(&self, request: &mut ApiRequest);
}

pub struct JsonContentType;

impl Interceptor for JsonContentType {
    fn intercept(&self, request: &mut ApiRequest) {
        request.set_default_header("Content-Type", "application/json".to_string());
    }
}

/// Attaches `Authorization: Bearer <token>` whenever the session holds a token.
pub struct BearerAuth {
    session: Rc<Session>,
}

impl BearerAuth {
    pub fn new(session: Rc<Session>) -> Self {
        Self { session }
    }
}

impl Interceptor for BearerAuth {
    fn intercept(&self, request: &mut ApiRequest) {
        if let Some(token) = self.session.token() {
            request.set_default_header("Authorization", format!("Bearer {token}"));
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("sign-in rejected with status {0}")]
    Rejected(u16),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected sign-in response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignInPayload {
    token: String,
    user: UserProfile,
}

#[derive(Serialize)]
struct VerifyTokenBody<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct VerifyTokenPayload {
    #[serde(default)]
    valid: bool,
    user: Option<UserProfile>,
}

pub struct ApiClient<T> {
    session: Rc<Session>,
    transport: T,
    interceptors: Vec<Box<dyn Interceptor>>,
    config: AppConfig,
}

impl<T: Transport> ApiClient<T> {
    /// Client with the default pipeline: JSON content type, then bearer auth.
    pub fn new(session: Rc<Session>, transport: T, config: &AppConfig) -> Self {
        Self {
            interceptors: vec![
                Box::new(JsonContentType),
                Box::new(BearerAuth::new(session.clone())),
            ],
            session,
            transport,
            config: config.clone(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    fn prepare(&self, url: &str, options: RequestOptions) -> ApiRequest {
        let mut request = ApiRequest {
            method: options.method,
            url: self.config.resolve_url(url),
            headers: options.headers,
            body: options.body,
        };
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }
        request
    }

    /// Sends through the pipeline. `None` means the call could not be
    /// completed: either a transport failure or a 401, which also ends the
    /// session. A 401 response never reaches the caller.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Option<ApiResponse> {
        let request = self.prepare(url, options);
        let method = request.method.as_str();
        let target = request.url.clone();
        match self.transport.send(request).await {
            Ok(response) if response.status == UNAUTHORIZED => {
                log::warn!("{method} {target} returned 401, ending session");
                self.session.logout();
                None
            }
            Ok(response) => {
                log::debug!("{method} {target} -> {}", response.status);
                Some(response)
            }
            Err(error) => {
                log::error!("API request failed: {method} {target}: {error}");
                None
            }
        }
    }

    pub async fn get(&self, url: &str) -> Option<ApiResponse> {
        self.request(url, RequestOptions::method(Method::Get)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, data: &B) -> Option<ApiResponse> {
        self.send_json(Method::Post, url, data).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, data: &B) -> Option<ApiResponse> {
        self.send_json(Method::Put, url, data).await
    }

    pub async fn delete(&self, url: &str) -> Option<ApiResponse> {
        self.request(url, RequestOptions::method(Method::Delete)).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        data: &B,
    ) -> Option<ApiResponse> {
        let body = match serde_json::to_string(data) {
            Ok(body) => body,
            Err(error) => {
                log::error!("failed to serialize {} body for {url}: {error}", method.as_str());
                return None;
            }
        };
        let options = RequestOptions {
            body: Some(body),
            ..RequestOptions::method(method)
        };
        self.request(url, options).await
    }

    /// Posts the credentials and stores the returned token and profile.
    /// Bad credentials come back as 401, which here means "rejected" rather
    /// than "session expired", so this bypasses the logout rule.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, SignInError> {
        let body = serde_json::to_string(&Credentials { username, password })?;
        let options = RequestOptions {
            body: Some(body),
            ..RequestOptions::method(Method::Post)
        };
        let request = self.prepare(&self.config.login_endpoint, options);
        let response = self.transport.send(request).await?;
        if !response.ok() {
            return Err(SignInError::Rejected(response.status));
        }
        let payload: SignInPayload = response.json()?;
        self.session.set_token(&payload.token);
        self.session.set_user(&payload.user);
        log::info!("signed in as {}", payload.user.username);
        Ok(payload.user)
    }

    /// Asks the server whether the stored token is still good and refreshes
    /// the stored profile when it is.
    pub async fn verify_session(&self) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };
        let Some(response) = self
            .post(&self.config.verify_endpoint, &VerifyTokenBody { token: &token })
            .await
        else {
            return false;
        };
        if !response.ok() {
            return false;
        }
        match response.json::<VerifyTokenPayload>() {
            Ok(payload) if payload.valid => {
                if let Some(user) = payload.user {
                    self.session.set_user(&user);
                }
                true
            }
            Ok(_) => false,
            Err(error) => {
                log::warn!("unexpected verify-token response: {error}");
                false
            }
        }
    }

    /// Tells the server, then always ends the local session.
    pub async fn sign_out(&self) {
        let endpoint = self.config.logout_endpoint.clone();
        match self.post(&endpoint, &serde_json::json!({})).await {
            Some(response) if !response.ok() => {
                log::warn!("logout endpoint answered {}", response.status)
            }
            _ => {}
        }
        self.session.logout();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned outcomes in order and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub outcomes: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
        pub sent: Rc<RefCell<Vec<ApiRequest>>>,
    }

    impl ScriptedTransport {
        pub fn replying(outcomes: Vec<Result<ApiResponse, TransportError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                sent: Rc::default(),
            }
        }
    }

    pub fn status(status: u16, body: &str) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse {
            status,
            body: body.to_string(),
        })
    }

    #[async_trait(?Send)]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.sent.borrow_mut().push(request);
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
        }
    }
}
