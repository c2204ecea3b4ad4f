//! Downloads a remote file into transient storage.
//!
//! The body is streamed into `{destination}.part` and renamed on success, so later stages never see
//! a partial file; on any failure or cancellation the partial file is removed.

use crate::error::FetchError;
use crate::storage::{ResourceRole, TransientResource};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

pub struct ResourceFetcher {
    client: reqwest::Client,
}

impl ResourceFetcher {
    /// Builds the HTTP client. `proxy` (e.g. `http://127.0.0.1:8889`) is applied to all downloads.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Streams `locator` to `destination` and returns it as a source resource owned by the caller.
    #[instrument(skip(self, locator), fields(destination = %destination.display()))]
    pub async fn fetch(
        &self,
        locator: &str,
        destination: &Path,
    ) -> Result<TransientResource, FetchError> {
        // Removed on drop, so a cancelled download leaves nothing behind.
        let part = TransientResource::new(part_path(destination), ResourceRole::Source);
        let result = match self.download(locator, part.path()).await {
            Ok(bytes) => tokio::fs::rename(part.path(), destination)
                .await
                .map(|_| bytes)
                .map_err(FetchError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                part.persist();
                info!(bytes, "Downloaded source file");
                Ok(TransientResource::new(
                    destination.to_path_buf(),
                    ResourceRole::Source,
                ))
            }
            Err(e) => {
                let path = part.path().to_path_buf();
                if let Err(rm) = part.release().await {
                    warn!(error = %rm, path = %path.display(), "Could not remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn download(&self, locator: &str, part: &Path) -> Result<u64, FetchError> {
        let mut response = self.client.get(locator).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact(locator),
            });
        }

        let mut file = tokio::fs::File::create(part).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        debug!(written, "Download stream finished");
        Ok(written)
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Bot API download URLs embed the token (`/file/bot<token>/...`); keep it out of errors and logs.
fn redact(url: &str) -> String {
    match url.find("/file/bot") {
        Some(start) => {
            let rest = &url[start + "/file/bot".len()..];
            match rest.find('/') {
                Some(slash) => format!("{}/file/bot<redacted>{}", &url[..start], &rest[slash..]),
                None => format!("{}/file/bot<redacted>", &url[..start]),
            }
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/work/pack_abc.tgs")),
            PathBuf::from("/work/pack_abc.tgs.part")
        );
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(
            redact("https://api.telegram.org/file/bot123:abc/stickers/a.tgs"),
            "https://api.telegram.org/file/bot<redacted>/stickers/a.tgs"
        );
        assert_eq!(redact("http://localhost/files/a"), "http://localhost/files/a");
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        assert!(ResourceFetcher::new(Duration::from_secs(5), Some("not a proxy url")).is_err());
        assert!(ResourceFetcher::new(Duration::from_secs(5), Some("http://127.0.0.1:8889")).is_ok());
    }
}
