use crate::app::ports::{FileStorePort, StoredFile};
use crate::common::error::{EnricherError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Pulls an upload from a URL. When the server advertises a
/// `Content-Length` past the ceiling the body is never downloaded; the
/// post-fetch size check in the fetcher still applies either way.
pub struct HttpFileStore {
    http: reqwest::Client,
    max_file_size_bytes: u64,
}

impl HttpFileStore {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            max_file_size_bytes,
        }
    }
}

#[async_trait]
impl FileStorePort for HttpFileStore {
    async fn fetch(&self, location: &str) -> Result<StoredFile> {
        debug!(location, "downloading file");
        let resp = self.http.get(location).send().await?.error_for_status()?;
        if let Some(len) = resp.content_length() {
            if len > self.max_file_size_bytes {
                return Err(EnricherError::FileRejected(format!(
                    "{location} advertises {len} bytes, over the {} byte limit",
                    self.max_file_size_bytes
                )));
            }
        }
        let bytes = resp.bytes().await?;
        Ok(StoredFile {
            size_bytes: bytes.len() as u64,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            file_name: remote_file_name(location),
        })
    }
}

/// Reads uploads straight off disk. Used by the CLI and tests.
pub struct LocalFileStore;

#[async_trait]
impl FileStorePort for LocalFileStore {
    async fn fetch(&self, location: &str) -> Result<StoredFile> {
        let path = Path::new(location);
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.to_string());
        Ok(StoredFile {
            size_bytes: bytes.len() as u64,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            file_name,
        })
    }
}

fn remote_file_name(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_names_drop_path_and_query() {
        assert_eq!(
            remote_file_name("https://files.example.com/uploads/contacts.csv?sig=x"),
            "contacts.csv"
        );
        assert_eq!(remote_file_name("https://files.example.com/"), "download");
    }

    #[tokio::test]
    async fn local_store_reads_a_file_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "email,name").unwrap();
        writeln!(f, "a@b.co,Anna").unwrap();

        let stored = LocalFileStore
            .fetch(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(stored.file_name, "contacts.csv");
        assert!(stored.text.starts_with("email,name"));
        assert_eq!(stored.size_bytes, stored.text.len() as u64);
    }

    #[tokio::test]
    async fn local_store_surfaces_missing_files_as_io_errors() {
        let err = LocalFileStore.fetch("/no/such/file.csv").await.unwrap_err();
        assert!(matches!(err, EnricherError::Io(_)));
    }
}
