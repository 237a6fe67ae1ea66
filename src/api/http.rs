use anyhow::Result;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::json;

use crate::api::{ApiError, FetchReply, MailTransport, RegisterReply, Reply, StatusReply};
use crate::config::Endpoints;
use crate::domain::credentials::Credentials;

const HEADER_EMAIL: &str = "X-User-Email";
const HEADER_PASSWORD: &str = "X-User-Password";

/// `MailTransport` over HTTPS. Holds nothing between calls except the pooled client.
pub struct HttpTransport {
    client: Client,
    endpoints: Endpoints,
}

impl HttpTransport {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rs_webmail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoints })
    }

    /// Runs the request and decodes the body whatever the status code is;
    /// anything that goes wrong on the way becomes a connection error.
    fn execute<R: Reply>(&self, op: &str, request: RequestBuilder) -> R {
        match exchange(request) {
            Ok(reply) => reply,
            Err(e) => {
                if let ApiError::Transport(detail) = &e {
                    warn!("{op}: {detail}");
                }
                R::failed(e.to_string())
            }
        }
    }

    fn with_credentials(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        request
            .header(HEADER_EMAIL, &credentials.email)
            .header(HEADER_PASSWORD, &credentials.password)
    }
}

fn exchange<R: Reply>(request: RequestBuilder) -> Result<R, ApiError> {
    let response = request
        .send()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    debug!("response status {status}, {} bytes", body.len());
    serde_json::from_str(&body)
        .map_err(|e| ApiError::Transport(format!("malformed response ({status}): {e}")))
}

impl MailTransport for HttpTransport {
    fn register(&self, full_name: &str, email: &str, password: &str) -> RegisterReply {
        debug!("register {email}");
        let request = self.client.post(&self.endpoints.register).json(&json!({
            "email": email,
            "password": password,
            "fullName": full_name,
        }));
        self.execute("register", request)
    }

    fn authenticate(&self, credentials: &Credentials) -> StatusReply {
        debug!("authenticate {}", credentials.email);
        let request = self.client.post(&self.endpoints.auth).json(credentials);
        self.execute("authenticate", request)
    }

    fn fetch_messages(&self, credentials: &Credentials, folder: &str, limit: u32) -> FetchReply {
        debug!("fetch {folder} (limit {limit}) for {}", credentials.email);
        let request = self
            .client
            .get(&self.endpoints.fetch)
            .query(&[("folder", folder.to_string()), ("limit", limit.to_string())]);
        self.execute("fetch", Self::with_credentials(request, credentials))
    }

    fn send_message(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> StatusReply {
        debug!("send from {} to {to}", credentials.email);
        let request = self.client.post(&self.endpoints.send).json(&json!({
            "to": to,
            "subject": subject,
            "content": body,
        }));
        self.execute("send", Self::with_credentials(request, credentials))
    }
}
