use crate::runtime::host::GpuProbe;

use super::probe::{GpuDevice, GpuPreference};

/// Enumerates every adapter wgpu can see across all native backends.
pub struct WgpuProbe;

impl GpuProbe for WgpuProbe {
    fn enumerate(&self) -> Result<Vec<GpuDevice>, String> {
        let instance =
            wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let devices = instance
            .enumerate_adapters(wgpu::Backends::all())
            .iter()
            .map(|adapter| device_from_info(&adapter.get_info()))
            .collect();

        Ok(devices)
    }
}

fn device_from_info(info: &wgpu::AdapterInfo) -> GpuDevice {
    GpuDevice::new(
        info.name.clone(),
        format!("{:?}", info.backend),
        preference_for(info.device_type),
    )
}

fn preference_for(device_type: wgpu::DeviceType) -> GpuPreference {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => GpuPreference::HighPerformance,
        wgpu::DeviceType::IntegratedGpu => GpuPreference::LowPower,
        _ => GpuPreference::Unspecified,
    }
}
