// Logical API operations.
//
// An `ApiRequest` names *what* to call (method, path, query, body). The
// adapter decides *how*: headers, token, envelope handling and the re-login
// retry. A future write operation is just another `ApiRequest::post(...)`.

use reqwest::Method;
use serde_json::Value;

/// A single logical call against the vendor API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST carrying a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut req = Self::new(Method::POST, path);
        req.body = Some(body);
        req
    }

    /// Append a query parameter. Order is preserved.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Mark the request as not needing the `auth` header (identity endpoint).
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_params_keep_insertion_order() {
        let req = ApiRequest::get("/app/device/getDeviceStatus")
            .query("mid", 42)
            .query("lang", "en");
        assert_eq!(
            req.query_params(),
            &[
                ("mid".to_owned(), "42".to_owned()),
                ("lang".to_owned(), "en".to_owned())
            ]
        );
        assert!(req.is_authenticated());
        assert_eq!(req.method(), &Method::GET);
    }

    #[test]
    fn post_carries_body_and_can_skip_auth() {
        let req = ApiRequest::post("/auth/basic/app/login", json!({"a": 1})).unauthenticated();
        assert_eq!(req.body(), Some(&json!({"a": 1})));
        assert!(!req.is_authenticated());
    }
}
