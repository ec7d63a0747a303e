use crate::api::ClientError;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// A replayable request description. Built fresh into a `reqwest` request on
/// every attempt so a 401 can be retried with a different token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) headers: HeaderMap,
    pub(crate) skip_auth: bool,
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            skip_auth: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// No stored access token is attached and a 401 is returned as is.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Sends `token` as the bearer instead of the stored access token.
    /// Implies [`skip_auth`](Self::skip_auth).
    pub fn bearer(self, token: &str) -> Result<Self, ClientError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        value.set_sensitive(true);
        Ok(self.header(AUTHORIZATION, value).skip_auth())
    }

    /// Treats the request as a replay: another 401 is returned to the
    /// caller without a refresh.
    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_skip_auth(&self) -> bool {
        self.skip_auth
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_implies_skip_auth() {
        let req = ApiRequest::post("/auth/refresh-token").bearer("r1").unwrap();
        assert!(req.is_skip_auth());
        assert_eq!(req.headers.get(AUTHORIZATION).unwrap(), "Bearer r1");
        assert!(req.headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn defaults_are_authenticated_first_attempt() {
        let req = ApiRequest::get("/user/me");
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/user/me");
        assert!(!req.is_skip_auth());
        assert!(!req.is_retried());
        assert!(req.mark_retried().is_retried());
    }

    #[test]
    fn json_body_is_captured() {
        #[derive(Serialize)]
        struct Body<'a> {
            ident: &'a str,
        }
        let req = ApiRequest::post("/auth/login").json(&Body { ident: "sam" }).unwrap();
        assert_eq!(req.body, Some(serde_json::json!({ "ident": "sam" })));
    }

    #[test]
    fn header_injection_is_rejected() {
        assert!(ApiRequest::get("/x").bearer("bad\r\ntoken").is_err());
    }
}
