//! Registry adapter reading the JSON server document from disk.

use crate::tool_session::{
    domain::ToolServerEntry,
    ports::{ToolServerRegistry, ToolServerRegistryError, ToolServerRegistryResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::io;

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    mcp_servers: Vec<ToolServerEntry>,
}

/// Reads `{"mcp_servers": [{"name": ..., "address": ...}]}` from a file.
///
/// The file is re-read on every call.
#[derive(Debug, Clone)]
pub struct JsonFileToolServerRegistry {
    path: Utf8PathBuf,
}

impl JsonFileToolServerRegistry {
    /// Creates a registry backed by the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl ToolServerRegistry for JsonFileToolServerRegistry {
    async fn load_entries(&self) -> ToolServerRegistryResult<Vec<ToolServerEntry>> {
        let path = self.path.clone();
        let location = path.to_string();
        let contents = tokio::task::spawn_blocking(move || read_document(&path))
            .await
            .map_err(|err| ToolServerRegistryError::unreadable(location.clone(), err))?
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => ToolServerRegistryError::NotFound(location.clone()),
                _ => ToolServerRegistryError::unreadable(location.clone(), err),
            })?;

        let document: RegistryDocument = serde_json::from_str(&contents)
            .map_err(|err| ToolServerRegistryError::malformed(location, err))?;
        Ok(document.mcp_servers)
    }
}

fn read_document(path: &Utf8Path) -> io::Result<String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "registry path has no file name"))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
