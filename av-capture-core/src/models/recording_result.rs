use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::binding::StreamBinding;
use super::config::{ContainerFormat, InterleavingMode};
use super::device::DeviceCategory;

/// Result returned when a recording reaches `Stopped`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: u32,
    /// Bound streams in multiplexer order.
    pub streams: Vec<StreamBinding>,
    /// Whether audio was made master and interleaving configured.
    pub synchronized: bool,
    /// Events dequeued while waiting, including the stop notification.
    pub events_consumed: usize,
    pub checksum: Option<String>,
    pub metadata: RecordingMetadata,
}

/// One stream inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub category: DeviceCategory,
    pub stream_index: u32,
    pub master: bool,
}

/// Metadata stored alongside a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub duration_secs: u32,
    pub container: ContainerFormat,
    pub tracks: Vec<TrackInfo>,
    pub interleaving: Option<InterleavingMode>,
    pub checksum: Option<String>,
}

impl RecordingMetadata {
    pub fn new(
        file_path: &str,
        duration_secs: u32,
        container: ContainerFormat,
        streams: &[StreamBinding],
        master: Option<DeviceCategory>,
        interleaving: Option<InterleavingMode>,
        checksum: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: file_path.to_string(),
            duration_secs,
            container,
            tracks: streams
                .iter()
                .map(|s| TrackInfo {
                    category: s.category,
                    stream_index: s.stream_index,
                    master: master == Some(s.category),
                })
                .collect(),
            interleaving,
            checksum,
        }
    }
}
