use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;

use crate::dao::{
    local_store::LocalStore,
    storage::{StorageError, StorageResult},
};

/// Stores each key as `<dir>/<key>.json`, replacing files atomically.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: Arc<PathBuf>,
}

impl FileLocalStore {
    /// Store writing one `<key>.json` file per key under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileLocalStore {
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to read `{}`", path.display()),
                    err,
                )),
            }
        })
    }

    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        Box::pin(async move {
            tokio::fs::create_dir_all(dir.as_ref())
                .await
                .map_err(|err| {
                    StorageError::unavailable(
                        format!("failed to create `{}`", dir.display()),
                        err,
                    )
                })?;
            tokio::fs::write(&tmp, value).await.map_err(|err| {
                StorageError::unavailable(format!("failed to write `{}`", tmp.display()), err)
            })?;
            tokio::fs::rename(&tmp, &path).await.map_err(|err| {
                StorageError::unavailable(format!("failed to replace `{}`", path.display()), err)
            })
        })
    }
}
