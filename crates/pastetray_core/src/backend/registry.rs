//! Name-keyed set of backend descriptors.

use super::{bundled, BackendDescriptor};
use crate::constants::BACKEND_DOCUMENT_EXTENSION;
use crate::error::{LoadError, RegistryError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Holds every known backend, keyed by name.
///
/// Built once at startup and read-only afterwards; descriptors are shared by
/// `Arc` so in-flight requests can outlive a registry reload.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<BackendDescriptor>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// # Returns
    /// The shared handle now owned by the registry.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateBackend`] when the name is taken; the registry
    /// is left unchanged.
    pub fn register(
        &mut self,
        descriptor: BackendDescriptor,
    ) -> Result<Arc<BackendDescriptor>, RegistryError> {
        if self.backends.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateBackend(
                descriptor.name().to_string(),
            ));
        }
        let shared = Arc::new(descriptor);
        self.backends
            .insert(shared.name().to_string(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Find a backend by exact name.
    pub fn lookup(&self, name: &str) -> Result<Arc<BackendDescriptor>, RegistryError> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownBackend(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Iterate descriptors in no particular order. Call again to restart.
    pub fn all(&self) -> impl Iterator<Item = &Arc<BackendDescriptor>> + '_ {
        self.backends.values()
    }

    /// Descriptors sorted case-insensitively by name.
    pub fn sorted(&self) -> Vec<Arc<BackendDescriptor>> {
        let mut items: Vec<Arc<BackendDescriptor>> = self.backends.values().cloned().collect();
        items.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.name().cmp(b.name()))
        });
        items
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Registry holding only the bundled backends.
    pub fn bundled() -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for descriptor in bundled::descriptors()? {
            let name = descriptor.name().to_string();
            registry
                .register(descriptor)
                .map_err(|source| LoadError::Registry {
                    path: PathBuf::from("<bundled>").join(name),
                    source,
                })?;
        }
        Ok(registry)
    }

    /// Load every `*.json` backend document in `dir`.
    ///
    /// Documents are read in file-name order. A missing directory, or one
    /// without any documents, yields [`Self::bundled`].
    ///
    /// # Errors
    /// Unreadable files, invalid documents and duplicate names abort loading.
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        let paths = match document_paths(dir)? {
            Some(paths) if !paths.is_empty() => paths,
            _ => {
                info!(
                    "no backend documents in {}, using bundled defaults",
                    dir.display()
                );
                return Self::bundled();
            }
        };

        let mut registry = Self::new();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            let descriptor =
                BackendDescriptor::from_json(&text).map_err(|source| LoadError::Descriptor {
                    path: path.clone(),
                    source,
                })?;
            debug!("loaded backend '{}' from {}", descriptor.name(), path.display());
            registry
                .register(descriptor)
                .map_err(|source| LoadError::Registry { path, source })?;
        }
        info!("loaded {} backend(s) from {}", registry.len(), dir.display());
        Ok(registry)
    }
}

fn document_paths(dir: &Path) -> Result<Option<Vec<PathBuf>>, LoadError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_document = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(BACKEND_DOCUMENT_EXTENSION));
        if is_document {
            paths.push(path);
        } else {
            warn!("skipping non-document file {}", path.display());
        }
    }
    paths.sort();
    Ok(Some(paths))
}
