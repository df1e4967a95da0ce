use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::config::{EXTENSION_DIR_NAME, STAGING_DIR_NAME};
use crate::runtime::host::ContentSession;

const MANIFEST_FILE: &str = "manifest.json";

#[derive(Deserialize)]
struct Manifest {
    name: String,
    version: String,
}

/// Read-only extension tree shipped with the application.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtensionBundle {
    pub name: String,
    pub version: String,
    pub root: PathBuf,
}

impl ExtensionBundle {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, String> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);

        let json = fs::read_to_string(&manifest_path).map_err(|err| {
            format!("failed to read {}: {}", manifest_path.display(), err)
        })?;

        let manifest =
            serde_json::from_str::<Manifest>(&json).map_err(|err| {
                format!("invalid {}: {}", manifest_path.display(), err)
            })?;

        if manifest.name.trim().is_empty() {
            return Err(format!(
                "{} has an empty name",
                manifest_path.display()
            ));
        }

        Ok(Self {
            name: manifest.name,
            version: manifest.version,
            root,
        })
    }

    fn staging_dir_name(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Writable copy of a bundle living under the staging root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagedExtension {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

/// The bundle next to the executable, or the crate's copy in development.
pub fn bundled_extension_dir() -> PathBuf {
    let beside_exe = env::current_exe().ok().and_then(|exe| {
        exe.parent().map(|dir| dir.join(EXTENSION_DIR_NAME))
    });

    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(EXTENSION_DIR_NAME),
    }
}

pub fn staging_root() -> PathBuf {
    env::temp_dir().join(STAGING_DIR_NAME).join("extensions")
}

/// Copies the bundle into `staging_root`. A directory left over from an
/// earlier staging is replaced wholesale.
pub fn stage_into(
    bundle: &ExtensionBundle,
    staging_root: &Path,
) -> Result<StagedExtension, String> {
    let dir_name = bundle.staging_dir_name();
    if dir_name.is_empty() {
        return Err(format!(
            "bundle at {} has no name to stage under",
            bundle.root.display()
        ));
    }
    let target = staging_root.join(dir_name);

    if target.exists() {
        debug!("Replacing previously staged {}", target.display());
        fs::remove_dir_all(&target).map_err(|err| {
            format!("failed to clear {}: {}", target.display(), err)
        })?;
    }

    copy_tree(&bundle.root, &target).map_err(|err| {
        format!(
            "failed to copy {} to {}: {}",
            bundle.root.display(),
            target.display(),
            err
        )
    })?;

    Ok(StagedExtension {
        name: bundle.name.clone(),
        version: bundle.version.clone(),
        path: target,
    })
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let destination = to.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }

    Ok(())
}

/// Stages and registers the bundle. Failures are logged and reported as
/// `None`; the caller carries on without the extension.
pub fn stage(
    bundle: &ExtensionBundle,
    staging_root: &Path,
    session: &dyn ContentSession,
) -> Option<StagedExtension> {
    let staged = match stage_into(bundle, staging_root) {
        Ok(staged) => staged,
        Err(err) => {
            error!("Failed to stage extension '{}': {}", bundle.name, err);
            return None;
        }
    };

    if let Err(err) = session.load_extension(&staged.path) {
        error!(
            "Failed to load extension from {}: {}",
            staged.path.display(),
            err
        );
        return None;
    }

    info!(
        "Extension {} {} loaded from temp path: {}",
        staged.name,
        staged.version,
        staged.path.display()
    );

    Some(staged)
}

pub struct StagingHandle {
    worker: Option<JoinHandle<Option<StagedExtension>>>,
}

impl StagingHandle {
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until staging completes.
    pub fn finish(mut self) -> Option<StagedExtension> {
        let worker = self.worker.take()?;
        worker.join().unwrap_or_else(|_| {
            error!("Extension staging thread panicked");
            None
        })
    }
}

/// Opens, stages and registers the bundle on a background thread.
pub fn spawn_stage(
    bundle_root: PathBuf,
    staging_root: PathBuf,
    session: Arc<dyn ContentSession>,
) -> StagingHandle {
    let spawned = thread::Builder::new()
        .name("extension-stager".to_string())
        .spawn(move || {
            let bundle = match ExtensionBundle::open(&bundle_root) {
                Ok(bundle) => bundle,
                Err(err) => {
                    error!("Failed to open extension bundle: {}", err);
                    return None;
                }
            };

            stage(&bundle, &staging_root, session.as_ref())
        });

    match spawned {
        Ok(worker) => StagingHandle {
            worker: Some(worker),
        },
        Err(err) => {
            error!("Failed to spawn extension stager: {}", err);
            StagingHandle { worker: None }
        }
    }
}

/// Content session state for a web view that reads extensions from a
/// directory when it is built. Only trees registered in this run count; the
/// window factory asks for [`ExtensionRegistry::extensions_path`] and builds
/// without extensions while it is `None`.
pub struct ExtensionRegistry {
    staging_root: PathBuf,
    supported: bool,
    registered: Mutex<Vec<PathBuf>>,
}

impl ExtensionRegistry {
    pub fn new(staging_root: PathBuf, supported: bool) -> Self {
        Self {
            staging_root,
            supported,
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    /// The staging root, once every tree under it was registered in this
    /// run. Stale or partially copied directories keep it `None`.
    pub fn extensions_path(&self) -> Option<&Path> {
        let registered = self.registered();
        if registered.is_empty() {
            return None;
        }

        let entries = match fs::read_dir(&self.staging_root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "Extensions path {} unreadable: {}",
                    self.staging_root.display(),
                    err
                );
                return None;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !registered.contains(&path) {
                warn!(
                    "Unregistered entry {} in extensions path; \
                     building without extensions",
                    path.display()
                );
                return None;
            }
        }

        Some(&self.staging_root)
    }
}

impl ContentSession for ExtensionRegistry {
    fn load_extension(&self, path: &Path) -> Result<(), String> {
        if !self.supported {
            return Err(
                "extensions are not supported by this platform's web view"
                    .to_string(),
            );
        }

        if path.parent() != Some(self.staging_root.as_path()) {
            return Err(format!(
                "{} is not directly under the extensions path {}",
                path.display(),
                self.staging_root.display()
            ));
        }

        if !path.join(MANIFEST_FILE).is_file() {
            return Err(format!("{} has no {}", path.display(), MANIFEST_FILE));
        }

        let mut registered =
            self.registered.lock().map_err(|err| err.to_string())?;
        if !registered.iter().any(|known| known == path) {
            registered.push(path.to_path_buf());
        }

        Ok(())
    }
}
