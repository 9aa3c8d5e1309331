//! Scene renderer camera derived from the host camera.

use tandem_engine::camera::CameraSnapshot;

/// Camera and projection parameters pushed into the scene renderer before
/// every single-layer draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
    pub near_z_multiplier: f64,
    pub far_z_multiplier: f64,
}

/// Copies the host camera and derives the depth multipliers.
///
/// The near plane multiplier is `1 / viewport_height` (or `1` while the height
/// is unknown) and the far multiplier is always `1`. The scene renderer's
/// projection depends on exactly these values; other choices show up as depth
/// fighting against the host's own 3D layers.
pub fn compute_view_state(camera: &CameraSnapshot, viewport_height: f32) -> ViewState {
    let near_z_multiplier = if viewport_height == 0.0 || viewport_height.is_nan() {
        1.0
    } else {
        1.0 / f64::from(viewport_height)
    };

    ViewState {
        longitude: camera.center.lng,
        latitude: camera.center.lat,
        zoom: camera.zoom,
        bearing: camera.bearing,
        pitch: camera.pitch,
        near_z_multiplier,
        far_z_multiplier: 1.0,
    }
}
