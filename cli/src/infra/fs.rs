//! Filesystem infrastructure — implements `LocalFiles`.

use std::path::Path;

use crate::application::ports::LocalFiles;

/// Production `LocalFiles` reading straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFiles for LocalFs {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
