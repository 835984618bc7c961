//! # av-capture-core
//!
//! Platform-agnostic capture pipeline orchestration.
//!
//! Records a fixed duration of camera and microphone input into a single
//! interleaved container. Locates the first usable device of each kind,
//! binds it into a multiplexer graph, schedules start/stop windows, makes
//! the audio stream the timing master when both are present, then waits
//! for the framework's stop notification. Platform backends (DirectShow on
//! Windows) implement the `CaptureFramework` trait and plug into the
//! generic `RecordingSession`.
//!
//! ## Architecture
//!
//! ```text
//! av-capture-core (this crate)
//! ├── traits/    ← CaptureFramework, MuxSyncControl, RecordingDelegate
//! ├── models/    ← CaptureError, RecorderState, RecorderConfig, StreamBinding, GraphEvent, etc.
//! ├── session/   ← locator, binder, scheduler, sync, PipelineGraph, RecordingSession
//! ├── storage/   ← checksum, metadata sidecar
//! └── testing    ← ScriptedFramework (in-memory backend)
//! ```

pub mod models;
pub mod session;
pub mod storage;
pub mod testing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::binding::{BindOutcome, StreamBinding};
pub use models::config::{ContainerFormat, InterleavingMode, RecorderConfig};
pub use models::device::{DeviceCategory, MediaType, SourceDescriptor, AUDIO_SOURCE, VIDEO_SOURCE};
pub use models::error::{CaptureError, FaultStage, FrameworkFault};
pub use models::event::{CompletionToken, EventCode, GraphEvent};
pub use models::recording_result::{RecordingMetadata, RecordingResult, TrackInfo};
pub use models::state::RecorderState;
pub use models::timing::{ReferenceTime, StreamWindow, TICKS_PER_SECOND};
pub use session::recorder::RecordingSession;
pub use session::sync::SyncPlan;
pub use traits::capture_framework::{CaptureFramework, MuxSyncControl};
pub use traits::recording_delegate::RecordingDelegate;
