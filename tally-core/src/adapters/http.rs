//! HTTP object client for WebDAV-style folder stores
//!
//! - `GET <base>/<folder>/` returns a JSON array of file names
//! - `GET`, `PUT`, `DELETE` on `<base>/<folder>/<file>` read, write and remove
//! - `MOVE` with a `Destination` header renames
//!
//! Credentials are passed through as basic auth and never stored elsewhere.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::ports::ObjectClient;

const TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct HttpObjectClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl HttpObjectClient {
    /// Create a client for the store at `base_url` (http or https)
    pub fn new(base_url: &str, username: Option<String>, password: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid remote storage URL '{base_url}': {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "remote storage URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("'{base_url}' cannot be used as a base URL")));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::storage(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            username,
            password,
        })
    }

    /// URL of a folder (with trailing slash) or of a file inside it
    fn url(&self, folder: &str, file: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("'{}' cannot be used as a base URL", self.base_url)))?;
            segments.pop_if_empty().push(folder);
            segments.push(file.unwrap_or(""));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().map_err(map_request_error)
    }
}

fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::storage(format!("connection timed out after {TIMEOUT_SECS} seconds"))
    } else if error.is_connect() {
        Error::storage("unable to connect to remote storage")
    } else {
        Error::storage(format!("remote storage request failed: {error}"))
    }
}

fn check_status(response: &Response) -> Result<()> {
    match response.status() {
        status if status.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::storage(
            "remote storage rejected the credentials; check the username and TALLY_REMOTE_PASSWORD",
        )),
        status => Err(Error::storage(format!("remote storage error: HTTP {}", status.as_u16()))),
    }
}

impl ObjectClient for HttpObjectClient {
    fn list(&self, folder: &str) -> Result<Vec<String>> {
        let response = self.send(self.request(Method::GET, self.url(folder, None)?))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        check_status(&response)?;
        response
            .json::<Vec<String>>()
            .map_err(|e| Error::storage(format!("invalid folder listing: {e}")))
    }

    fn download(&self, folder: &str, name: &str) -> Result<Option<Vec<u8>>> {
        let response = self.send(self.request(Method::GET, self.url(folder, Some(name))?))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(&response)?;
        let bytes = response.bytes().map_err(map_request_error)?;
        Ok(Some(bytes.to_vec()))
    }

    fn upload(&self, folder: &str, name: &str, contents: &[u8]) -> Result<()> {
        let request = self
            .request(Method::PUT, self.url(folder, Some(name))?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(contents.to_vec());
        check_status(&self.send(request)?)
    }

    fn delete(&self, folder: &str, name: &str) -> Result<()> {
        let response = self.send(self.request(Method::DELETE, self.url(folder, Some(name))?))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(&response)
    }

    fn rename(&self, folder: &str, from: &str, to: &str) -> Result<()> {
        let method = Method::from_bytes(b"MOVE")
            .map_err(|e| Error::storage(format!("unsupported HTTP method: {e}")))?;
        let destination = self.url(folder, Some(to))?;
        let request = self
            .request(method, self.url(folder, Some(from))?)
            .header("Destination", destination.as_str())
            .header("Overwrite", "F");
        check_status(&self.send(request)?)
    }
}
