pub mod flags;
pub mod probe;
#[cfg(feature = "native")]
pub mod wgpu_probe;

pub use flags::{Flag, FlagSet, RuntimeConfig, flags_for};
pub use probe::{CapabilityTier, GpuDevice, GpuPreference, classify, detect};
