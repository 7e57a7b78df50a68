//! A blocking WebHDFS REST client.

use std::sync::OnceLock;

use bytes::Bytes;
use reqwest::{
    Method,
    blocking::{Client, RequestBuilder, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};
use url::Url;

use super::config::ConnectorConfig;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("Invalid WebHDFS endpoint {endpoint:?}: {source}"))]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },

    #[snafu(display("WebHDFS {operation} request failed: {source}"))]
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },

    #[snafu(display("WebHDFS {operation} failed with status {status}: {exception}: {message}"))]
    Remote {
        operation: &'static str,
        status: u16,
        exception: String,
        message: String,
    },

    #[snafu(display("WebHDFS operation did not complete: {source}"))]
    Task { source: tokio::task::JoinError },
}

/// The kind of a filesystem entry.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// Status of a filesystem entry, as reported by the namenode.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub path_suffix: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub length: u64,
    pub owner: String,
    pub group: String,
    pub permission: String,
    pub access_time: u64,
    pub modification_time: u64,
    pub block_size: u64,
    pub replication: u32,
}

/// The operations of a synchronous WebHDFS client.
///
/// Every call blocks the current thread until the namenode (and, for data transfers, the
/// datanode it redirects to) has answered.
pub trait WebHdfs: Send + Sync + 'static {
    /// Reads the whole content of a file.
    fn open(&self, path: &str) -> Result<Bytes, ClientError>;

    /// Creates a file holding `data`.
    fn create(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), ClientError>;

    /// Appends `data` to an existing file.
    fn append(&self, path: &str, data: Bytes) -> Result<(), ClientError>;

    /// Creates a directory and all missing parents.
    fn mkdirs(&self, path: &str) -> Result<bool, ClientError>;

    /// Lists the entries of a directory.
    fn list_status(&self, path: &str) -> Result<Vec<FileStatus>, ClientError>;

    fn get_file_status(&self, path: &str) -> Result<FileStatus, ClientError>;

    fn rename(&self, from: &str, to: &str) -> Result<bool, ClientError>;

    fn delete(&self, path: &str, recursive: bool) -> Result<bool, ClientError>;
}

#[derive(Deserialize)]
struct RemoteExceptionBody {
    #[serde(rename = "RemoteException")]
    remote_exception: RemoteException,
}

#[derive(Deserialize)]
struct RemoteException {
    exception: String,
    message: String,
}

#[derive(Deserialize)]
struct BooleanBody {
    boolean: bool,
}

#[derive(Deserialize)]
struct FileStatusBody {
    #[serde(rename = "FileStatus")]
    file_status: FileStatus,
}

#[derive(Deserialize)]
struct FileStatusesBody {
    #[serde(rename = "FileStatuses")]
    file_statuses: FileStatusList,
}

#[derive(Deserialize)]
struct FileStatusList {
    #[serde(rename = "FileStatus")]
    file_status: Vec<FileStatus>,
}

/// A WebHDFS client talking to a single namenode over HTTP.
///
/// Building the client performs no I/O. The HTTP client is created by the first operation, so a
/// `RestClient` can be built from async code as long as its operations run off the runtime.
#[derive(Debug)]
pub struct RestClient {
    http: OnceLock<Client>,
    endpoint: Url,
    user: String,
}

impl RestClient {
    /// Builds a client for the active namenode of a resolved configuration.
    pub fn new(config: &ConnectorConfig) -> Result<Self, ClientError> {
        let endpoint = format!(
            "http://{}:{}{}",
            config.current_host, config.namenode_port, config.path_prefix
        );
        let endpoint = Url::parse(&endpoint).context(InvalidEndpointSnafu { endpoint })?;

        Ok(Self {
            http: OnceLock::new(),
            endpoint,
            user: config.user.clone(),
        })
    }

    /// Builds the URL of an operation on `path`.
    pub fn operation_url(&self, path: &str, operation: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        let prefix = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", operation);
            query.append_pair("user.name", &self.user);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        url
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        params: &[(&str, &str)],
    ) -> RequestBuilder {
        self.http
            .get_or_init(Client::new)
            .request(method, self.operation_url(path, operation, params))
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().context(RequestSnafu { operation })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let (exception, message) = match serde_json::from_str::<RemoteExceptionBody>(&body) {
            Ok(RemoteExceptionBody { remote_exception }) => {
                (remote_exception.exception, remote_exception.message)
            }
            Err(_) => (
                status.canonical_reason().unwrap_or("Unknown").to_owned(),
                body,
            ),
        };

        RemoteSnafu {
            operation,
            status: status.as_u16(),
            exception,
            message,
        }
        .fail()
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(operation, request)?
            .json()
            .context(RequestSnafu { operation })
    }
}

impl WebHdfs for RestClient {
    fn open(&self, path: &str) -> Result<Bytes, ClientError> {
        let request = self.request(Method::GET, path, "OPEN", &[]);
        self.send("OPEN", request)?
            .bytes()
            .context(RequestSnafu { operation: "OPEN" })
    }

    fn create(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), ClientError> {
        let overwrite = if overwrite { "true" } else { "false" };
        let request = self
            .request(Method::PUT, path, "CREATE", &[("overwrite", overwrite)])
            .body(data.to_vec());
        self.send("CREATE", request).map(drop)
    }

    fn append(&self, path: &str, data: Bytes) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, path, "APPEND", &[])
            .body(data.to_vec());
        self.send("APPEND", request).map(drop)
    }

    fn mkdirs(&self, path: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::PUT, path, "MKDIRS", &[]);
        self.send_json::<BooleanBody>("MKDIRS", request)
            .map(|body| body.boolean)
    }

    fn list_status(&self, path: &str) -> Result<Vec<FileStatus>, ClientError> {
        let request = self.request(Method::GET, path, "LISTSTATUS", &[]);
        self.send_json::<FileStatusesBody>("LISTSTATUS", request)
            .map(|body| body.file_statuses.file_status)
    }

    fn get_file_status(&self, path: &str) -> Result<FileStatus, ClientError> {
        let request = self.request(Method::GET, path, "GETFILESTATUS", &[]);
        self.send_json::<FileStatusBody>("GETFILESTATUS", request)
            .map(|body| body.file_status)
    }

    fn rename(&self, from: &str, to: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::PUT, from, "RENAME", &[("destination", to)]);
        self.send_json::<BooleanBody>("RENAME", request)
            .map(|body| body.boolean)
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool, ClientError> {
        let recursive = if recursive { "true" } else { "false" };
        let request = self.request(Method::DELETE, path, "DELETE", &[("recursive", recursive)]);
        self.send_json::<BooleanBody>("DELETE", request)
            .map(|body| body.boolean)
    }
}
