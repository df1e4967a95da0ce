#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use zarina::extension::ExtensionRegistry;
use zarina::gpu::{CapabilityTier, GpuDevice, GpuPreference, RuntimeConfig};
use zarina::presence::PresenceCredentials;
use zarina::runtime::host::{
    Clipboard, ContentSession, ContentWindow, Dialogs, GpuProbe,
    HostServices, PresenceConnector, PresenceStream, WindowFactory,
};
use zarina::runtime::{BootstrapOptions, Shell};

pub fn gpu_tests_enabled() -> bool {
    matches!(
        env::var("ZARINA_RUN_GPU_TESTS")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Everything the fakes observe, in the order it happened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Record {
    WindowCreated { tier: CapabilityTier, args: String },
    WindowDropped,
    Loaded(String),
    Title(String),
    Fullscreen(bool),
    Notice(String),
    ExtensionLoaded(PathBuf),
    /// The extensions directory a web view would be built with.
    ExtensionsPath(Option<PathBuf>),
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Record>>>);

impl Journal {
    pub fn push(&self, record: Record) {
        self.0.lock().unwrap().push(record);
    }

    pub fn records(&self) -> Vec<Record> {
        self.0.lock().unwrap().clone()
    }

    pub fn loaded(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Loaded(address) => Some(address),
                _ => None,
            })
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Title(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> usize {
        self.records()
            .iter()
            .filter(|record| matches!(record, Record::Notice(_)))
            .count()
    }

    pub fn windows_created(&self) -> usize {
        self.records()
            .iter()
            .filter(|record| matches!(record, Record::WindowCreated { .. }))
            .count()
    }
}

pub enum FakeGpu {
    Devices(Vec<GpuDevice>),
    Fails,
    Hangs,
}

impl FakeGpu {
    pub fn discrete() -> Self {
        Self::Devices(vec![
            GpuDevice::new("Intel UHD", "Vulkan", GpuPreference::LowPower),
            GpuDevice::new(
                "GeForce RTX",
                "Vulkan",
                GpuPreference::HighPerformance,
            ),
        ])
    }

    pub fn integrated() -> Self {
        Self::Devices(vec![GpuDevice::new(
            "Intel UHD",
            "Dx12",
            GpuPreference::LowPower,
        )])
    }

    pub fn none() -> Self {
        Self::Devices(Vec::new())
    }
}

impl GpuProbe for FakeGpu {
    fn enumerate(&self) -> Result<Vec<GpuDevice>, String> {
        match self {
            Self::Devices(devices) => Ok(devices.clone()),
            Self::Fails => Err("no graphics backend".to_string()),
            Self::Hangs => {
                std::thread::sleep(Duration::from_secs(2));
                Ok(Vec::new())
            }
        }
    }
}

pub struct RecordingSession {
    journal: Journal,
}

impl ContentSession for RecordingSession {
    fn load_extension(&self, path: &Path) -> Result<(), String> {
        self.journal.push(Record::ExtensionLoaded(path.to_path_buf()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RefusingConnector {
    pub attempts: AtomicUsize,
}

impl PresenceConnector for RefusingConnector {
    fn connect(&self) -> Result<Box<dyn PresenceStream>, String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("discord is not running".to_string())
    }
}

#[derive(Clone, Default)]
pub struct FakeClipboard(Arc<Mutex<Option<String>>>);

impl FakeClipboard {
    pub fn set(&self, text: Option<&str>) {
        *self.0.lock().unwrap() = text.map(str::to_string);
    }
}

impl Clipboard for FakeClipboard {
    fn read_text(&mut self) -> Result<Option<String>, String> {
        Ok(self.0.lock().unwrap().clone())
    }
}

pub struct RecordingDialogs {
    journal: Journal,
}

impl Dialogs for RecordingDialogs {
    fn show_notice(&self, title: &str, _message: &str) {
        self.journal.push(Record::Notice(title.to_string()));
    }
}

pub struct FakeWindow {
    journal: Journal,
    fullscreen: bool,
}

impl ContentWindow for FakeWindow {
    fn load_url(&mut self, url: &str) -> Result<(), String> {
        self.journal.push(Record::Loaded(url.to_string()));
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.journal.push(Record::Title(title.to_string()));
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        self.journal.push(Record::Fullscreen(fullscreen));
    }
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.journal.push(Record::WindowDropped);
    }
}

pub struct FakeWindowFactory {
    pub journal: Journal,
    pub refuse: bool,
    pub registry: Option<Arc<ExtensionRegistry>>,
}

impl FakeWindowFactory {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            refuse: false,
            registry: None,
        }
    }
}

impl WindowFactory for FakeWindowFactory {
    fn create_window(
        &mut self,
        config: &RuntimeConfig,
    ) -> Result<Box<dyn ContentWindow>, String> {
        if self.refuse {
            return Err("no display".to_string());
        }

        self.journal.push(Record::WindowCreated {
            tier: config.tier(),
            args: config.browser_args().to_string(),
        });

        if let Some(registry) = &self.registry {
            let path = registry.extensions_path().map(Path::to_path_buf);
            self.journal.push(Record::ExtensionsPath(path));
        }

        Ok(Box::new(FakeWindow {
            journal: self.journal.clone(),
            fullscreen: false,
        }))
    }
}

/// Writes a minimal extension bundle under `dir`.
pub fn write_bundle(dir: &Path) -> PathBuf {
    let bundle = dir.join("bundle");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(
        bundle.join("manifest.json"),
        r#"{ "manifest_version": 3, "name": "EvPatch", "version": "1.0.0" }"#,
    )
    .unwrap();
    fs::write(bundle.join("content.js"), "// patch").unwrap();
    bundle
}

pub struct Harness {
    pub shell: Shell,
    pub journal: Journal,
    pub clipboard: FakeClipboard,
    pub factory: FakeWindowFactory,
    pub staging_root: PathBuf,
    pub presence: Arc<RefusingConnector>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(gpu: FakeGpu) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bundle_root = write_bundle(dir.path());
        Self::build(gpu, dir, bundle_root, false)
    }

    /// A harness whose bundle directory does not exist.
    pub fn without_bundle(gpu: FakeGpu) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bundle_root = dir.path().join("missing");
        Self::build(gpu, dir, bundle_root, false)
    }

    /// Uses the real extension registry as the session, and has the window
    /// factory record the extensions path it would build with.
    pub fn with_registry(gpu: FakeGpu, bundled: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bundle_root = if bundled {
            write_bundle(dir.path())
        } else {
            dir.path().join("missing")
        };
        Self::build(gpu, dir, bundle_root, true)
    }

    fn build(
        gpu: FakeGpu,
        dir: tempfile::TempDir,
        bundle_root: PathBuf,
        use_registry: bool,
    ) -> Self {
        let journal = Journal::default();
        let clipboard = FakeClipboard::default();
        let staging_root = dir.path().join("staging");
        let presence = Arc::new(RefusingConnector::default());
        let mut factory = FakeWindowFactory::new(&journal);

        let session: Arc<dyn ContentSession> = if use_registry {
            let registry =
                Arc::new(ExtensionRegistry::new(staging_root.clone(), true));
            factory.registry = Some(registry.clone());
            registry
        } else {
            Arc::new(RecordingSession {
                journal: journal.clone(),
            })
        };

        let host = HostServices {
            gpu: Arc::new(gpu),
            session,
            presence: presence.clone(),
            clipboard: Box::new(clipboard.clone()),
            dialogs: Box::new(RecordingDialogs {
                journal: journal.clone(),
            }),
        };

        let options = BootstrapOptions {
            probe_timeout: Duration::from_millis(200),
            bundle_root,
            staging_root: staging_root.clone(),
            presence: PresenceCredentials::default(),
        };

        Self {
            shell: Shell::new(host, options),
            factory,
            journal,
            clipboard,
            staging_root,
            presence,
            _dir: dir,
        }
    }

    pub fn send(
        &mut self,
        event: zarina::runtime::AppEvent,
    ) -> zarina::runtime::Lifecycle {
        self.shell.handle(event, &mut self.factory)
    }

    pub fn presence_attempts(&self) -> usize {
        self.presence.attempts.load(Ordering::SeqCst)
    }
}
