use std::sync::Arc;

use bytes::Bytes;
use snafu::ResultExt;

use super::client::{ClientError, FileStatus, TaskSnafu, WebHdfs};

/// Asynchronous face of a [`WebHdfs`] client.
///
/// Each operation of the wrapped client is exposed again as a future. The blocking call runs on
/// the runtime's blocking pool, and its outcome, failures included, is delivered through the
/// returned future. Calls are independent of one another: nothing orders concurrent operations
/// on the same handle.
#[derive(Debug)]
pub struct HdfsClient<C> {
    inner: Arc<C>,
}

impl<C> Clone for HdfsClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: WebHdfs> HdfsClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Gets the wrapped synchronous client.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    async fn call<T, F>(&self, operation: F) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, ClientError> + Send + 'static,
    {
        let client = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || operation(&client))
            .await
            .context(TaskSnafu)?
    }

    pub async fn open(&self, path: impl Into<String>) -> Result<Bytes, ClientError> {
        let path = path.into();
        self.call(move |client| client.open(&path)).await
    }

    pub async fn create(
        &self,
        path: impl Into<String>,
        data: impl Into<Bytes>,
        overwrite: bool,
    ) -> Result<(), ClientError> {
        let (path, data) = (path.into(), data.into());
        self.call(move |client| client.create(&path, data, overwrite))
            .await
    }

    pub async fn append(
        &self,
        path: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        let (path, data) = (path.into(), data.into());
        self.call(move |client| client.append(&path, data)).await
    }

    pub async fn mkdirs(&self, path: impl Into<String>) -> Result<bool, ClientError> {
        let path = path.into();
        self.call(move |client| client.mkdirs(&path)).await
    }

    pub async fn list_status(&self, path: impl Into<String>) -> Result<Vec<FileStatus>, ClientError> {
        let path = path.into();
        self.call(move |client| client.list_status(&path)).await
    }

    pub async fn get_file_status(&self, path: impl Into<String>) -> Result<FileStatus, ClientError> {
        let path = path.into();
        self.call(move |client| client.get_file_status(&path))
            .await
    }

    pub async fn rename(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<bool, ClientError> {
        let (from, to) = (from.into(), to.into());
        self.call(move |client| client.rename(&from, &to)).await
    }

    pub async fn delete(&self, path: impl Into<String>, recursive: bool) -> Result<bool, ClientError> {
        let path = path.into();
        self.call(move |client| client.delete(&path, recursive))
            .await
    }
}
