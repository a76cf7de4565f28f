//! Host collaborator bindings.
//!
//! The engine knows nothing about these: each one is an ordinary factory in
//! the root namespace that depends on the `$host` value, exactly like any
//! user binding.
//!
//! | Binding    | Type               |
//! |------------|--------------------|
//! | `$host`    | [`HostEnvironment`] |
//! | `$console` | [`Console`]        |
//! | `$storage` | [`StorageHandle`]  |
//! | `$Worker`  | [`WorkerFactory`]  |

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use zone_common::constants::{
    APP_NAME, CONSOLE_BINDING, HOST_BINDING, STORAGE_BINDING, WORKER_BINDING,
};
use zone_common::error::{Result, ZoneError};
use zone_core::{FunctionDescriptor, Instance, Zone};

/// Facts about the process hosting the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    app_name: String,
    storage_dir: PathBuf,
}

impl HostEnvironment {
    /// Describes a host with the given storage directory.
    #[must_use]
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            storage_dir: storage_dir.into(),
        }
    }

    /// Name the host reports in logs and thread names.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Directory handed to the storage binding.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

/// Logging sink backed by `tracing`.
#[derive(Debug, Clone)]
pub struct Console {
    source: String,
}

impl Console {
    /// Creates a console whose events carry `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Name attached to every event.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Emits a debug event.
    pub fn debug(&self, message: &str) {
        tracing::debug!(source = %self.source, "{message}");
    }

    /// Emits an info event.
    pub fn info(&self, message: &str) {
        tracing::info!(source = %self.source, "{message}");
    }

    /// Emits a warning event.
    pub fn warn(&self, message: &str) {
        tracing::warn!(source = %self.source, "{message}");
    }

    /// Emits an error event.
    pub fn error(&self, message: &str) {
        tracing::error!(source = %self.source, "{message}");
    }
}

/// Key-value storage rooted in a directory, one file per key.
///
/// Nothing touches the filesystem until a key is written or read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle {
    root: PathBuf,
}

impl StorageHandle {
    /// Opens storage rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the stored keys.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(ZoneError::Config {
                message: format!("invalid storage key: \"{key}\""),
            });
        }
        Ok(self.root.join(key))
    }

    /// Stores `bytes` under `key`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Config`] for an invalid key and
    /// [`ZoneError::Io`] if the write fails.
    pub fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root).map_err(|source| ZoneError::Io {
            path: self.root.clone(),
            source,
        })?;
        std::fs::write(&path, bytes).map_err(|source| ZoneError::Io { path, source })
    }

    /// Reads the content stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Config`] for an invalid key and
    /// [`ZoneError::Io`] if the read fails for a reason other than absence.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ZoneError::Io { path, source }),
        }
    }

    /// Deletes `key`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Config`] for an invalid key and
    /// [`ZoneError::Io`] if the removal fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ZoneError::Io { path, source }),
        }
    }

    /// Every stored key, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Io`] if the directory exists but cannot be read.
    pub fn keys(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ZoneError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };
        let mut keys: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Constructor for background workers running on named OS threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFactory {
    prefix: String,
}

impl WorkerFactory {
    /// Creates a factory naming its threads `<prefix>-<name>`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Starts `work` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Invocation`] if the thread cannot be spawned.
    pub fn spawn<F, T>(&self, name: &str, work: F) -> Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let thread_name = format!("{}-{name}", self.prefix);
        tracing::debug!(worker = %thread_name, "spawning worker");
        std::thread::Builder::new()
            .name(thread_name)
            .spawn(work)
            .map_err(|err| ZoneError::Invocation {
                source: Box::new(err),
            })
    }
}

/// Registers the host bindings in the root namespace of `zone`.
///
/// # Errors
///
/// Returns [`ZoneError::AlreadyBound`] if any of the names is taken and
/// [`ZoneError::Sealed`] if the root has already been looked into.
pub fn install(zone: &Zone, host: HostEnvironment) -> Result<()> {
    tracing::debug!(storage = %host.storage_dir().display(), "installing host bindings");
    let root = zone.root();
    let _ = root
        .value(HOST_BINDING, host)?
        .factory(
            CONSOLE_BINDING,
            FunctionDescriptor::from_fn([HOST_BINDING], |call| {
                let host = call.required::<HostEnvironment>(0)?;
                Ok(Instance::new(Console::new(host.app_name())))
            }),
        )?
        .factory(
            STORAGE_BINDING,
            FunctionDescriptor::from_fn([HOST_BINDING], |call| {
                let host = call.required::<HostEnvironment>(0)?;
                Ok(Instance::new(StorageHandle::new(host.storage_dir())))
            }),
        )?
        .factory(
            WORKER_BINDING,
            FunctionDescriptor::from_fn([HOST_BINDING], |call| {
                let host = call.required::<HostEnvironment>(0)?;
                Ok(Instance::new(WorkerFactory::new(host.app_name())))
            }),
        )?;
    Ok(())
}
