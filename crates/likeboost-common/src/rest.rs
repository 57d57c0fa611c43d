//! # Stateless REST utilities and request/response mapping
//!
//! Every remote contract (auth service, table API, RPCs, functions) is
//! described by a type implementing [`Endpoint`]. The call builder turns
//! it into an `http::Request`, and [`Response`] maps the reply back.
//!
//! Mapping overview:
//! - Success (2xx): decode body into the endpoint's typed output.
//! - Endpoints with [`Endpoint::OUTPUT_ON_ERROR`] try the typed output on
//!   any status first (the like-delivery function answers business
//!   rejections with a JSON outcome body).
//! - 401 whose message mentions expiry: `AuthError::TokenExpired`, so the
//!   credential session can refresh and retry once.
//! - Anything else: [`RemoteError`] built from the error body.

use crate::AuthorizationToken;
use crate::error::{
    AuthError, ClientError, ClientResult, DecodeError, EncodeError, RemoteError, TransportError,
};
use crate::http_client::HttpClient;
use bytes::Bytes;
use http::{
    HeaderName, HeaderValue, Request, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use std::marker::PhantomData;
use url::Url;

/// JSON media type used for every request and response body
pub const JSON: &str = "application/json";

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestMethod {
    /// Read (parameters go in the query string)
    Get,
    /// Create or invoke (JSON body)
    Post,
    /// Partial update (JSON body plus filter query)
    Patch,
    /// Remove (filter query only)
    Delete,
}

impl RestMethod {
    /// Get the HTTP method
    pub fn as_http(&self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
        }
    }

    /// Whether requests with this method carry a body
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Patch)
    }
}

/// Trait for typed REST endpoints.
///
/// The trait is implemented on the request parameters/input type itself.
/// For `GET` endpoints the value is encoded as the query string; for
/// `POST`/`PATCH` it is the JSON body and any filters come from
/// [`Endpoint::query`].
pub trait Endpoint: Serialize {
    /// Path below the backend base URL, e.g. `/functions/v1/process-likes`
    const PATH: &'static str;

    /// HTTP verb
    const METHOD: RestMethod;

    /// Decode the body as [`Endpoint::Output`] even on non-success statuses
    const OUTPUT_ON_ERROR: bool = false;

    /// Typed output
    type Output: DeserializeOwned;

    /// Query string for this request, without the leading `?`.
    fn query(&self) -> Result<Option<String>, EncodeError> {
        if let RestMethod::Get = Self::METHOD {
            let qs = serde_html_form::to_string(self)?;
            Ok((!qs.is_empty()).then_some(qs))
        } else {
            Ok(None)
        }
    }

    /// Encode the request body. Defaults to JSON for methods with a body.
    fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        if Self::METHOD.has_body() {
            Ok(serde_json::to_vec(self)?)
        } else {
            Ok(Vec::new())
        }
    }

    /// Endpoint-specific headers (e.g. `Prefer`)
    fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        Vec::new()
    }

    /// Decode the response body. An empty body decodes as JSON `null`.
    fn decode_output(body: &[u8]) -> Result<Self::Output, DecodeError> {
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        Ok(serde_json::from_slice(body)?)
    }
}

/// Per-request options for REST calls.
#[derive(Debug, Default, Clone)]
pub struct CallOptions {
    /// Optional Authorization to apply.
    pub auth: Option<AuthorizationToken>,
    /// Project API key sent as the `apikey` header.
    pub api_key: Option<SmolStr>,
    /// Extra headers to attach to this request.
    pub extra_headers: Vec<(HeaderName, HeaderValue)>,
}

/// Extension for stateless REST calls on any `HttpClient`.
///
/// Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use likeboost_common::rest::RestExt;
///
/// let http = reqwest::Client::new();
/// let base = url::Url::parse("https://project.example.co")?;
/// let call = http.rest(base).api_key("anon-key");
/// // let resp = call.send(&request).await?;
/// # Ok(())
/// # }
/// ```
pub trait RestExt: HttpClient {
    /// Start building a REST call for the given base URL.
    fn rest(&self, base: Url) -> RestCall<'_, Self>
    where
        Self: Sized,
    {
        RestCall {
            client: self,
            base,
            opts: CallOptions::default(),
        }
    }
}

impl<T: HttpClient> RestExt for T {}

/// Stateless REST call builder.
pub struct RestCall<'a, C: HttpClient> {
    pub(crate) client: &'a C,
    pub(crate) base: Url,
    pub(crate) opts: CallOptions,
}

impl<'a, C: HttpClient> RestCall<'a, C> {
    /// Apply Authorization to this call.
    pub fn auth(mut self, token: AuthorizationToken) -> Self {
        self.opts.auth = Some(token);
        self
    }
    /// Set the `apikey` header for this call.
    pub fn api_key(mut self, key: impl Into<SmolStr>) -> Self {
        self.opts.api_key = Some(key.into());
        self
    }
    /// Add an extra header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.opts.extra_headers.push((name, value));
        self
    }
    /// Replace the builder's options entirely.
    pub fn with_options(mut self, opts: CallOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Send the given typed request and return a response wrapper.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, request), fields(path = E::PATH)))]
    pub async fn send<E>(self, request: &E) -> ClientResult<Response<E>>
    where
        E: Endpoint,
    {
        let http_request = build_http_request(&self.base, request, &self.opts)?;

        let http_response = self
            .client
            .send_http(http_request)
            .await
            .map_err(|e| TransportError::Other(Box::new(e)))?;

        Ok(process_response(http_response))
    }
}

/// Wrap a raw HTTP response into a typed response.
///
/// Exposed to make things more easily pluggable
#[inline]
pub fn process_response<E: Endpoint>(http_response: http::Response<Vec<u8>>) -> Response<E> {
    let status = http_response.status();
    Response::new(Bytes::from(http_response.into_body()), status)
}

/// Build an HTTP request for a REST call given base URL and options
pub fn build_http_request<E>(
    base: &Url,
    req: &E,
    opts: &CallOptions,
) -> core::result::Result<Request<Vec<u8>>, ClientError>
where
    E: Endpoint,
{
    let mut url = base.clone();
    let mut path = url.path().trim_end_matches('/').to_owned();
    path.push_str(E::PATH);
    url.set_path(&path);
    url.set_query(req.query()?.as_deref());

    let mut builder = Request::builder()
        .method(E::METHOD.as_http())
        .uri(url.as_str())
        .header(ACCEPT, JSON);

    if E::METHOD.has_body() {
        builder = builder.header(CONTENT_TYPE, JSON);
    }

    if let Some(key) = &opts.api_key {
        let hv = HeaderValue::from_str(key).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid api key: {}", e))
        })?;
        builder = builder.header(HeaderName::from_static("apikey"), hv);
    }

    if let Some(token) = &opts.auth {
        let hv = HeaderValue::try_from(token).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid authorization token: {}", e))
        })?;
        builder = builder.header(AUTHORIZATION, hv);
    }

    for (name, value) in req.headers().iter().chain(opts.extra_headers.iter()) {
        builder = builder.header(name, value);
    }

    let body = req.encode_body()?;

    builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()).into())
}

/// REST response wrapper that owns the response buffer
pub struct Response<E: Endpoint> {
    _marker: PhantomData<fn() -> E>,
    buffer: Bytes,
    status: StatusCode,
}

impl<E: Endpoint> Response<E> {
    /// Create a new response from a buffer and status code
    pub fn new(buffer: Bytes, status: StatusCode) -> Self {
        Self {
            buffer,
            status,
            _marker: PhantomData,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the raw buffer
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Whether the backend rejected the access token as expired.
    pub fn is_token_expired(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
            && RemoteError::from_body(self.status, &self.buffer)
                .message
                .to_ascii_lowercase()
                .contains("expired")
    }

    /// Parse the response into the endpoint's output
    pub fn parse(&self) -> ClientResult<E::Output> {
        if self.status.is_success() {
            return Ok(E::decode_output(&self.buffer)?);
        }
        if E::OUTPUT_ON_ERROR {
            if let Ok(output) = E::decode_output(&self.buffer) {
                return Ok(output);
            }
        }
        if self.is_token_expired() {
            return Err(AuthError::TokenExpired.into());
        }
        Err(RemoteError::from_body(self.status, &self.buffer).into())
    }

    /// Parse the response, consuming the wrapper
    pub fn into_output(self) -> ClientResult<E::Output> {
        self.parse()
    }
}
