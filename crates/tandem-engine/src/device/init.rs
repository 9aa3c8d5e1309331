/// Parameters for requesting a headless GPU context.
///
/// Hosts that already own a device should use [`GpuContext::from_parts`]
/// instead; this is for tools and tests that need their own device.
///
/// [`GpuContext::from_parts`]: super::GpuContext::from_parts
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter preference.
    pub power_preference: wgpu::PowerPreference,

    /// Backends the instance may pick from.
    pub backends: wgpu::Backends,

    /// Color format of the render target shared by host and hosted renderers.
    pub target_format: wgpu::TextureFormat,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::all(),
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
