use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::{ContextId, GpuInit};

/// Cheaply cloneable handle to the device both renderers draw with.
///
/// Clones share the same device, queue and id. Neither renderer owns the
/// context; whoever created it decides when it goes away.
#[derive(Clone)]
pub struct GpuContext {
    inner: Arc<Inner>,
}

struct Inner {
    id: ContextId,
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Wraps a device/queue pair the host already created.
    pub fn from_parts(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let id = ContextId::next();
        log::debug!("gpu context {id} wrapped (target format {target_format:?})");
        Self {
            inner: Arc::new(Inner {
                id,
                device,
                queue,
                target_format,
            }),
        }
    }

    /// Requests a headless adapter and device.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            power_preference,
            backends,
            target_format,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tandem shared device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self::from_parts(device, queue, target_format))
    }

    /// Blocking variant of [`GpuContext::new`] for synchronous callers.
    #[cfg(feature = "blocking")]
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.inner.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.inner.queue
    }

    /// Color format every hosted pipeline must target.
    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.inner.target_format
    }

    /// True when both handles refer to the same device.
    #[inline]
    pub fn same_context(&self, other: &GpuContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("id", &self.inner.id)
            .field("target_format", &self.inner.target_format)
            .finish_non_exhaustive()
    }
}
