//! Request description and construction.
//!
//! # Responsibilities
//! - Describe a call (endpoint, method, headers, body, token, timeout)
//! - Turn a description into a concrete `reqwest::Request`
//! - Attach a unique request ID per attempt
//!
//! # Design Decisions
//! - Caller headers are merged over `Content-Type: application/json`
//! - `Authorization` is only present when a token is
//! - Multipart bodies drop the content-type so reqwest sets the boundary
//! - Construction borrows the description, so every retry rebuilds from the
//!   same untouched input

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::endpoints::Endpoint;

/// Header carrying the per-attempt request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// One file in a multipart body.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A multipart/form-data body that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub text_fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.text_fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    fn to_form(&self) -> ApiResult<Form> {
        let mut form = Form::new();
        for (name, value) in &self.text_fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type '{}': {}", file.mime, e)))?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

/// Request body variants.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// Everything needed to issue one logical call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
            token: None,
            timeout: None,
        }
    }

    pub fn get(endpoint: Endpoint) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: Endpoint) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: Endpoint) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: Endpoint) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn patch(endpoint: Endpoint) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("body is not serializable: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Attach a bearer token; `None` leaves the request anonymous.
    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Build the concrete request for one attempt.
pub fn build_request(
    http: &reqwest::Client,
    base: &Url,
    user_agent: &str,
    request: &ApiRequest,
    request_id: &str,
) -> ApiResult<reqwest::Request> {
    let url = request.endpoint.resolve(base)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    if let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("token contains invalid header characters".into()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    let builder = match &request.body {
        RequestBody::Empty => http.request(request.method.clone(), url).headers(headers),
        RequestBody::Json(value) => {
            let text = serde_json::to_string(value)
                .map_err(|e| ApiError::InvalidRequest(format!("body is not serializable: {}", e)))?;
            http.request(request.method.clone(), url).headers(headers).body(text)
        }
        RequestBody::Multipart(body) => {
            headers.remove(CONTENT_TYPE);
            http.request(request.method.clone(), url)
                .headers(headers)
                .multipart(body.to_form()?)
        }
    };

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::endpoints;

    fn base() -> Url {
        Url::parse("http://localhost:8080/api").unwrap()
    }

    fn build(request: &ApiRequest) -> reqwest::Request {
        build_request(&reqwest::Client::new(), &base(), "test-agent", request, "req-1").unwrap()
    }

    fn upload_body() -> MultipartBody {
        MultipartBody::default()
            .text("title", "clip")
            .text("tags", r#"["a","b"]"#)
            .file(FilePart {
                field: "video".into(),
                file_name: "clip.mp4".into(),
                mime: "video/mp4".into(),
                bytes: vec![0, 1, 2, 3],
            })
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization() {
        let req = build(&ApiRequest::get(endpoints::videos()));
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.headers()[X_REQUEST_ID], "req-1");
        assert_eq!(*req.method(), Method::GET);
    }

    #[tokio::test]
    async fn test_empty_token_is_anonymous() {
        let req = build(&ApiRequest::get(endpoints::videos()).bearer(Some(String::new())));
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let req = build(&ApiRequest::get(endpoints::my_videos()).bearer(Some("T".into())));
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer T");
        assert_eq!(req.url().as_str(), "http://localhost:8080/api/videos/my-videos");
    }

    #[tokio::test]
    async fn test_json_body_serialized() {
        let req = build(
            &ApiRequest::post(endpoints::login())
                .json(&serde_json::json!({"email": "a@b.com", "password": "secret1"}))
                .unwrap(),
        );
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(parsed["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_caller_headers_override_defaults() {
        let req = build(&ApiRequest::get(endpoints::videos()).header("Content-Type", "text/plain"));
        assert_eq!(req.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(req.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_multipart_drops_caller_content_type() {
        let request = ApiRequest::post(endpoints::videos())
            .header("Content-Type", "application/json")
            .bearer(Some("T".into()))
            .multipart(upload_body());
        let req = build(&request);

        let content_types: Vec<_> = req.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types.len(), 1);
        let ct = content_types[0].to_str().unwrap();
        assert!(ct.starts_with("multipart/form-data; boundary="), "got {ct}");
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer T");
    }

    #[tokio::test]
    async fn test_description_left_untouched() {
        let request = ApiRequest::post(endpoints::videos())
            .header("Content-Type", "application/json")
            .multipart(upload_body());
        let _ = build(&request);
        let _ = build(&request);

        assert_eq!(request.headers, vec![("Content-Type".to_string(), "application/json".to_string())]);
        assert!(request.is_multipart());
        assert!(request.token.is_none());
    }

    #[tokio::test]
    async fn test_invalid_header_rejected() {
        let request = ApiRequest::get(endpoints::videos()).header("bad header", "x");
        let err = build_request(&reqwest::Client::new(), &base(), "ua", &request, "id").unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
