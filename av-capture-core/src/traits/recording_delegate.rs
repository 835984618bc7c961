use crate::models::device::DeviceCategory;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecorderState;

/// Event delegate for recording session notifications.
///
/// All methods are called synchronously from the thread running
/// `RecordingSession::record`.
pub trait RecordingDelegate: Send + Sync {
    /// Called on every state transition.
    fn on_state_changed(&self, state: &RecorderState);

    /// Called when a category has no usable device and the recording
    /// continues without it.
    fn on_source_missing(&self, category: DeviceCategory);

    /// Called once the container file is finalized.
    fn on_recording_finished(&self, result: &RecordingResult);
}
