//! Platform event translation.

#[cfg(feature = "winit")]
pub mod winit;
