use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("unable to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to render document: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Storage seam for generated documents so report assembly can be exercised
/// without touching the filesystem.
pub trait DocumentStore: Debug + Send + Sync {
    /// Writes `contents` to `path`, replacing any previous file. A failed
    /// save must not leave a truncated file behind.
    fn save(&self, path: &Path, contents: &[u8]) -> Result<(), DocumentError>;
    fn load(&self, path: &Path) -> Result<String, DocumentError>;
}

/// Filesystem store writing through a temporary sibling and a rename.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn save(&self, path: &Path, contents: &[u8]) -> Result<(), DocumentError> {
        let write_error = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let staging = staging_path(path);
        let result = fs::File::create(&staging)
            .and_then(|mut file| {
                file.write_all(contents)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&staging, path));

        if let Err(source) = result {
            let _ = fs::remove_file(&staging);
            return Err(write_error(source));
        }
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<String, DocumentError> {
        fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
