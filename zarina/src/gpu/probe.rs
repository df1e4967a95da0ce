use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::runtime::host::GpuProbe;

/// Coarse classification of the graphics hardware that drives flag
/// selection. Derived once per process.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CapabilityTier {
    Discrete,
    Integrated,
    None,
}

/// Power preference a device advertises to the host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GpuPreference {
    HighPerformance,
    LowPower,
    Unspecified,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GpuDevice {
    pub name: String,
    pub backend: String,
    pub preference: GpuPreference,
}

impl GpuDevice {
    pub fn new(
        name: impl Into<String>,
        backend: impl Into<String>,
        preference: GpuPreference,
    ) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            preference,
        }
    }
}

/// Any high-performance device wins, then any low-power device, otherwise
/// the system is treated as having no usable GPU.
pub fn classify(devices: &[GpuDevice]) -> CapabilityTier {
    let has = |preference: GpuPreference| {
        devices.iter().any(|d| d.preference == preference)
    };

    if has(GpuPreference::HighPerformance) {
        CapabilityTier::Discrete
    } else if has(GpuPreference::LowPower) {
        CapabilityTier::Integrated
    } else {
        CapabilityTier::None
    }
}

/// Runs the probe on a worker thread and classifies its report. Any failure
/// (probe error, timeout, empty report, panicking probe) yields
/// [`CapabilityTier::None`].
pub fn detect(probe: Arc<dyn GpuProbe>, timeout: Duration) -> CapabilityTier {
    match query(probe, timeout) {
        Ok(devices) => {
            log_device_report(&devices);
            let tier = classify(&devices);
            info!("Detected capability tier: {:?}", tier);
            tier
        }
        Err(err) => {
            warn!(
                "Failed to detect GPU information: {}; using {:?} tier",
                err,
                CapabilityTier::None
            );
            CapabilityTier::None
        }
    }
}

fn query(
    probe: Arc<dyn GpuProbe>,
    timeout: Duration,
) -> Result<Vec<GpuDevice>, String> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("gpu-probe".to_string())
        .spawn(move || {
            let _ = tx.send(probe.enumerate());
        })
        .map_err(|err| format!("failed to spawn GPU probe: {}", err))?;

    let devices = rx.recv_timeout(timeout).map_err(|err| match err {
        RecvTimeoutError::Timeout => {
            format!("GPU probe timed out after {:?}", timeout)
        }
        RecvTimeoutError::Disconnected => {
            "GPU probe exited without a report".to_string()
        }
    })??;

    if devices.is_empty() {
        return Err("no graphics devices reported".to_string());
    }

    Ok(devices)
}

fn log_device_report(devices: &[GpuDevice]) {
    for device in devices {
        debug!(
            "GPU device '{}' via {} ({:?})",
            device.name, device.backend, device.preference
        );
    }
}
