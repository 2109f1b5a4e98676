//! File transfer layered on remote command execution.
//!
//! Content is base64-encoded and streamed through the command's standard
//! input/output, so arbitrary bytes never appear on a shell command line.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::application::ports::{LocalFiles, RemoteTarget};
use crate::domain::{RemoteCommand, TransferError};

/// Permission bits of files that hold key material.
const PRIVATE_MODE: &str = "600";

/// Uploads and downloads file content on a [`RemoteTarget`].
#[derive(Debug, Clone, Copy)]
pub struct FileTransfer {
    verify_checksum: bool,
}

impl Default for FileTransfer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FileTransfer {
    #[must_use]
    pub fn new(verify_checksum: bool) -> Self {
        Self { verify_checksum }
    }

    /// Write `contents` to `remote_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidPath`] for relative or directory paths,
    /// [`TransferError::Remote`] when a remote command fails and
    /// [`TransferError::ChecksumMismatch`] when verification is enabled and
    /// the written file differs.
    pub async fn upload(
        &self,
        target: &dyn RemoteTarget,
        contents: &[u8],
        remote_path: &str,
    ) -> Result<(), TransferError> {
        self.write(target, contents, remote_path, None).await
    }

    /// Like [`FileTransfer::upload`], but the file is owner-only (`0600`)
    /// before any content reaches it, including when it already existed with
    /// wider permissions.
    ///
    /// # Errors
    ///
    /// As [`FileTransfer::upload`].
    pub async fn upload_private(
        &self,
        target: &dyn RemoteTarget,
        contents: &[u8],
        remote_path: &str,
    ) -> Result<(), TransferError> {
        self.write(target, contents, remote_path, Some(PRIVATE_MODE))
            .await
    }

    /// Upload the local file at `local_path` to `remote_path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::LocalRead`] if the file cannot be read, or any
    /// error of [`FileTransfer::upload`].
    pub async fn upload_file(
        &self,
        target: &dyn RemoteTarget,
        files: &dyn LocalFiles,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), TransferError> {
        let contents = read_local(files, local_path)?;
        self.upload(target, &contents, remote_path).await
    }

    /// Upload the local file at `local_path` as a private file.
    ///
    /// # Errors
    ///
    /// As [`FileTransfer::upload_file`].
    pub async fn upload_private_file(
        &self,
        target: &dyn RemoteTarget,
        files: &dyn LocalFiles,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), TransferError> {
        let contents = read_local(files, local_path)?;
        self.upload_private(target, &contents, remote_path).await
    }

    async fn write(
        &self,
        target: &dyn RemoteTarget,
        contents: &[u8],
        remote_path: &str,
        mode: Option<&str>,
    ) -> Result<(), TransferError> {
        let dir = parent_dir(remote_path)?;
        tracing::debug!(node = %target.node(), path = remote_path, bytes = contents.len(), "uploading");

        let encoded = STANDARD.encode(contents);
        target
            .execute(&RemoteCommand::new("mkdir").args(["-p", dir]))
            .await?;
        if let Some(mode) = mode {
            // Replaces any existing file; the redirect below keeps the mode.
            target
                .execute(&RemoteCommand::new("install").args(["-m", mode, "/dev/null", remote_path]))
                .await?;
        }
        target
            .execute_with_stdin(
                &RemoteCommand::new("base64").arg("-d").stdout_to(remote_path),
                encoded.as_bytes(),
            )
            .await?;

        if self.verify_checksum {
            verify(target, contents, remote_path).await?;
        }
        Ok(())
    }

    /// Read the file at `remote_path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Remote`] if the file cannot be read on the node
    /// and [`TransferError::Decode`] if the node's output is not valid base64.
    pub async fn download(
        &self,
        target: &dyn RemoteTarget,
        remote_path: &str,
    ) -> Result<Vec<u8>, TransferError> {
        tracing::debug!(node = %target.node(), path = remote_path, "downloading");
        let result = target
            .execute(&RemoteCommand::new("base64").args(["-w0", remote_path]))
            .await?;
        let encoded: String = result
            .stdout
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(encoded)
            .map_err(|e| TransferError::Decode {
                path: remote_path.to_string(),
                reason: e.to_string(),
            })
    }
}

fn read_local(files: &dyn LocalFiles, local_path: &Path) -> Result<Vec<u8>, TransferError> {
    files
        .read(local_path)
        .map_err(|source| TransferError::LocalRead {
            path: local_path.display().to_string(),
            source,
        })
}

async fn verify(
    target: &dyn RemoteTarget,
    contents: &[u8],
    remote_path: &str,
) -> Result<(), TransferError> {
    let expected = format!("{:x}", Sha256::digest(contents));
    let result = target
        .execute(&RemoteCommand::new("sha256sum").arg(remote_path))
        .await?;
    let actual = result
        .stdout
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if actual != expected {
        return Err(TransferError::ChecksumMismatch {
            path: remote_path.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Directory part of an absolute file path.
fn parent_dir(remote_path: &str) -> Result<&str, TransferError> {
    let invalid = || TransferError::InvalidPath(remote_path.to_string());
    if !remote_path.starts_with('/') || remote_path.ends_with('/') || remote_path.contains('\0') {
        return Err(invalid());
    }
    let (dir, name) = remote_path.rsplit_once('/').ok_or_else(invalid)?;
    if name.is_empty() || name == "." || name == ".." {
        return Err(invalid());
    }
    Ok(if dir.is_empty() { "/" } else { dir })
}
