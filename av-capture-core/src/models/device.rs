use std::fmt;

use serde::{Deserialize, Serialize};

/// Class of capture device a source is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Video,
    Audio,
}

impl DeviceCategory {
    /// Binding order. Video is bound first, so it becomes stream 0 and
    /// audio (when present) stream 1.
    pub const BIND_ORDER: [DeviceCategory; 2] = [DeviceCategory::Video, DeviceCategory::Audio];

    pub fn descriptor(self) -> SourceDescriptor {
        match self {
            Self::Video => VIDEO_SOURCE,
            Self::Audio => AUDIO_SOURCE,
        }
    }

    /// Human-facing name of the physical device, used in status output.
    pub fn device_label(self) -> &'static str {
        match self {
            Self::Video => "camera",
            Self::Audio => "microphone",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Major media type carried by a capture pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

/// Everything that differs between binding a camera and binding a microphone.
///
/// Backends translate these tags into their own constants (device class,
/// media type GUID); the orchestration logic never branches on category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceDescriptor {
    pub category: DeviceCategory,
    pub media_type: MediaType,
}

pub const VIDEO_SOURCE: SourceDescriptor = SourceDescriptor {
    category: DeviceCategory::Video,
    media_type: MediaType::Video,
};

pub const AUDIO_SOURCE: SourceDescriptor = SourceDescriptor {
    category: DeviceCategory::Audio,
    media_type: MediaType::Audio,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_order_puts_video_first() {
        assert_eq!(DeviceCategory::BIND_ORDER, [DeviceCategory::Video, DeviceCategory::Audio]);
    }

    #[test]
    fn descriptors_match_category() {
        for category in DeviceCategory::BIND_ORDER {
            assert_eq!(category.descriptor().category, category);
        }
        assert_eq!(DeviceCategory::Audio.descriptor().media_type, MediaType::Audio);
    }

    #[test]
    fn labels() {
        assert_eq!(DeviceCategory::Video.device_label(), "camera");
        assert_eq!(DeviceCategory::Audio.device_label(), "microphone");
        assert_eq!(DeviceCategory::Audio.to_string(), "audio");
    }
}
