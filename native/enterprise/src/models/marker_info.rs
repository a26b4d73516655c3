use serde::{Deserialize, Serialize};

/// A spatial marker detected by the headset cameras.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerInfo {
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,

    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    pub rotation_w: f64,

    /// 1 if the detection is valid, 0 otherwise
    pub valid_flag: i32,
    /// 1 for static markers, 0 for dynamic ones
    pub marker_type: i32,
    #[serde(rename = "iMarkerId")]
    pub marker_id: i32,
    /// Timestamp of the camera frame the marker was detected in
    #[serde(rename = "dTimestamp")]
    pub timestamp: f64,
    #[serde(default)]
    pub reserve: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingOrigin {
    #[default]
    Device,
    Floor,
}

/// Describes the application's tracking space so markers can be moved into it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarkerTracking {
    pub origin: TrackingOrigin,
    /// Camera rig height; only honored with [`TrackingOrigin::Device`]
    pub camera_y_offset: f32,
    /// Height of the tracking origin above the sensor origin
    pub origin_height: f32,
}

impl MarkerInfo {
    /// Converts a marker from the service's right-handed frame into the
    /// application's left-handed frame, lifted to the tracking origin.
    pub fn to_app_frame(&self, tracking: &MarkerTracking) -> Self {
        let y_offset = match tracking.origin {
            TrackingOrigin::Device => tracking.camera_y_offset,
            TrackingOrigin::Floor => 0.0,
        };
        Self {
            pos_x: self.pos_x,
            pos_y: self.pos_y + f64::from(tracking.origin_height) + f64::from(y_offset),
            pos_z: -self.pos_z,
            rotation_x: -self.rotation_x,
            rotation_y: -self.rotation_y,
            rotation_z: self.rotation_z,
            rotation_w: self.rotation_w,
            ..self.clone()
        }
    }
}
