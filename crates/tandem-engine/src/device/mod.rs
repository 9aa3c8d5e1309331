//! Shared GPU context.
//!
//! The host renderer owns the wgpu device. Every renderer it hosts draws
//! through the same `GpuContext`, and per-context state elsewhere is keyed by
//! its `ContextId`.

mod context;
mod id;
mod init;

pub use context::GpuContext;
pub use id::ContextId;
pub use init::GpuInit;
