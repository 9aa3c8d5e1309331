//! Host camera snapshots.
//!
//! The host map renderer owns the camera. Hosted renderers only ever see a
//! copy taken at the start of a draw callback.

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[inline]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

/// Camera state as read from the host at one instant.
///
/// `bearing` and `pitch` are in degrees, `zoom` in the host's web-mercator
/// zoom levels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CameraSnapshot {
    pub center: LngLat,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl CameraSnapshot {
    #[inline]
    pub const fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            bearing: 0.0,
            pitch: 0.0,
        }
    }

    #[inline]
    pub const fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    #[inline]
    pub const fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn is_finite(self) -> bool {
        self.center.is_finite()
            && self.zoom.is_finite()
            && self.bearing.is_finite()
            && self.pitch.is_finite()
    }
}
