use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{CloudSessionError, Subject};
use super::types::{CloudUser, NewCloudUser, Reply};
use super::CloudSession;
use crate::config::CloudSessionConfig;

/// HTTP client for the cloud session service.
#[derive(Debug, Clone)]
pub struct CloudSessionClient {
    http: reqwest::Client,
    base_url: Url,
    server: String,
}

impl CloudSessionClient {
    pub fn new(config: &CloudSessionConfig) -> Result<Self, CloudSessionError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| CloudSessionError::Config(format!("base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CloudSessionError::Config(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CloudSessionError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            server: config.server.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    /// Send a request and unwrap the reply envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
        subject: Subject<'_>,
    ) -> Result<T, CloudSessionError> {
        let resp = request
            .send()
            .await
            .map_err(|e| CloudSessionError::Server(format!("{}: {}", operation, e)))?;

        let status = resp.status();
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CloudSessionError::Server(format!("{}: HTTP {} {}", operation, status, body)));
        }

        let reply: Reply<T> = resp
            .json()
            .await
            .map_err(|e| CloudSessionError::Server(format!("{}: undecodable reply: {}", operation, e)))?;

        debug!("cloud session {} replied success={} code={:?}", operation, reply.success, reply.code);

        if !reply.success {
            let code = reply.code.unwrap_or(i32::from(status.as_u16()));
            return Err(CloudSessionError::from_code(code, reply.message, subject));
        }

        reply
            .user
            .ok_or_else(|| CloudSessionError::Server(format!("{}: reply without user", operation)))
    }
}

#[async_trait]
impl CloudSession for CloudSessionClient {
    async fn register_user(&self, registration: &NewCloudUser) -> Result<i64, CloudSessionError> {
        let request = self
            .http
            .post(self.endpoint(&["user", "register"]))
            .header("server", &self.server)
            .form(registration);
        self.call(request, "register_user", Subject::Email(&registration.email)).await
    }

    async fn authenticate_local_user(&self, email: &str, password: &str) -> Result<CloudUser, CloudSessionError> {
        let request = self
            .http
            .post(self.endpoint(&["authenticate", "local"]))
            .header("server", &self.server)
            .form(&[("email", email), ("password", password)]);
        self.call(request, "authenticate_local_user", Subject::Email(email)).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<CloudUser, CloudSessionError> {
        let id_segment = id.to_string();
        let request = self.http.get(self.endpoint(&["user", "id", &id_segment]));
        self.call(request, "get_user_by_id", Subject::Id(id)).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<CloudUser, CloudSessionError> {
        let request = self.http.get(self.endpoint(&["user", "email", email]));
        self.call(request, "get_user_by_email", Subject::Email(email)).await
    }

    async fn change_user_locale(&self, id: i64, locale: &str) -> Result<CloudUser, CloudSessionError> {
        let id_segment = id.to_string();
        let request = self
            .http
            .post(self.endpoint(&["user", "locale", &id_segment]))
            .form(&[("locale", locale)]);
        self.call(request, "change_user_locale", Subject::Id(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> CloudSessionConfig {
        CloudSessionConfig {
            server: "blocklab".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn builds_endpoints_under_base_path() {
        let client = CloudSessionClient::new(&config("http://cs.local:5011/api/")).unwrap();
        assert_eq!(
            client.endpoint(&["user", "email", "a b@c.org"]).as_str(),
            "http://cs.local:5011/api/user/email/a%20b@c.org"
        );

        let bare = CloudSessionClient::new(&config("http://cs.local:5011")).unwrap();
        assert_eq!(bare.endpoint(&["authenticate", "local"]).as_str(), "http://cs.local:5011/authenticate/local");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            CloudSessionClient::new(&config("mailto:ops@example.org")),
            Err(CloudSessionError::Config(_))
        ));
        assert!(CloudSessionClient::new(&config("not a url")).is_err());
    }
}
