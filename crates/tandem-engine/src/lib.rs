//! Tandem engine crate.
//!
//! Primitives shared by a host map renderer and the scene renderer it hosts:
//! the GPU context handle both draw through, the host camera snapshot, and
//! renderer-agnostic pointer input.

pub mod camera;
pub mod device;
pub mod input;
pub mod logging;
