use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::model::{ImageFile, PreviewHandle};

use super::ShellError;

/// Native stand-in for browser object URLs: every picked file gets a
/// unique `file://` handle that stays live until the core releases it.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<String, PathBuf>,
    issued: u64,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, path: &Path) -> Result<PreviewHandle, ShellError> {
        let absolute =
            std::fs::canonicalize(path).map_err(|_| ShellError::Preview(path.to_path_buf()))?;
        let url =
            Url::from_file_path(&absolute).map_err(|()| ShellError::Preview(path.to_path_buf()))?;

        self.issued += 1;
        // The same file picked twice still yields two distinct handles.
        let handle = format!("{url}#preview-{}", self.issued);
        self.live.insert(handle.clone(), absolute);

        debug!(%handle, "preview acquired");
        Ok(PreviewHandle::new(handle))
    }

    pub fn release(&mut self, handle: &str) -> bool {
        let released = self.live.remove(handle).is_some();
        if released {
            debug!(%handle, "preview released");
        } else {
            warn!(%handle, "release of unknown preview");
        }
        released
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }
}

/// Reads a file and insists that it is an image, by content first and
/// by extension as a fallback.
pub async fn load_image(path: &Path) -> Result<ImageFile, ShellError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ShellError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let format = image::guess_format(&bytes)
        .or_else(|_| image::ImageFormat::from_path(path))
        .map_err(|_| ShellError::NotAnImage(path.to_path_buf()))?;

    let name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());

    Ok(ImageFile::new(name, format.to_mime_type(), bytes))
}
