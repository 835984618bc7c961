use crate::models::binding::StreamBinding;
use crate::models::config::InterleavingMode;
use crate::models::device::DeviceCategory;
use crate::models::error::{CaptureError, FaultStage};
use crate::traits::capture_framework::{CaptureFramework, MuxSyncControl};

use super::graph::PipelineGraph;

/// How the multiplexer was told to keep two streams aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    pub master: DeviceCategory,
    pub master_stream: u32,
    pub interleaving: InterleavingMode,
}

/// Make the audio stream the multiplexer's timing reference and set the
/// interleaving mode. Only meaningful when both a camera and a microphone
/// were bound.
///
/// With audio as master the multiplexer adjusts the video stream's rate to
/// the audio clock, so the two independently clocked devices do not drift
/// apart over long recordings.
pub fn coordinate<F: CaptureFramework>(
    graph: &mut PipelineGraph<'_, F>,
    video: &StreamBinding,
    audio: &StreamBinding,
    interleaving: InterleavingMode,
) -> Result<SyncPlan, CaptureError> {
    debug_assert_eq!(video.category, DeviceCategory::Video);
    debug_assert_eq!(audio.category, DeviceCategory::Audio);

    let mut control = graph
        .sync_control()
        .map_err(|e| CaptureError::fault(FaultStage::SyncCapability, None, e))?;

    control
        .set_master_stream(audio.stream_index)
        .map_err(|e| CaptureError::fault(FaultStage::SetMasterStream, None, e))?;

    control
        .set_interleaving(interleaving)
        .map_err(|e| CaptureError::fault(FaultStage::SetInterleaving, None, e))?;

    log::info!(
        "audio stream {} is master, video stream {} follows ({:?} interleaving)",
        audio.stream_index,
        video.stream_index,
        interleaving
    );

    Ok(SyncPlan {
        master: DeviceCategory::Audio,
        master_stream: audio.stream_index,
        interleaving,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::models::config::ContainerFormat;
    use crate::models::device::{AUDIO_SOURCE, VIDEO_SOURCE};
    use crate::models::event::CompletionToken;
    use crate::session::binder;
    use crate::testing::{Call, Failure, ScriptedFramework};

    fn bind_both(graph: &mut PipelineGraph<'_, ScriptedFramework>) -> (StreamBinding, StreamBinding) {
        let video = binder::bind(graph, &VIDEO_SOURCE, 1, CompletionToken::RECORDING).unwrap();
        let audio = binder::bind(graph, &AUDIO_SOURCE, 1, CompletionToken::RECORDING).unwrap();
        (*video.binding().unwrap(), *audio.binding().unwrap())
    }

    #[test]
    fn audio_becomes_master_with_capture_interleaving() {
        let mut framework = ScriptedFramework::new().with_camera("cam").with_microphone("mic");
        let handle = framework.handle();
        let mut graph = PipelineGraph::assemble(&mut framework, Path::new("s.avi"), ContainerFormat::Avi).unwrap();
        let (video, audio) = bind_both(&mut graph);

        let plan = coordinate(&mut graph, &video, &audio, InterleavingMode::Capture).unwrap();

        assert_eq!(plan.master, DeviceCategory::Audio);
        assert_eq!(plan.master_stream, 1);
        assert_eq!(handle.count(|c| *c == Call::SetMasterStream(1)), 1);
        assert_eq!(handle.count(|c| *c == Call::SetInterleaving(InterleavingMode::Capture)), 1);
    }

    #[test]
    fn each_sync_step_is_fatal() {
        for (failure, stage) in [
            (Failure::SyncCapability, FaultStage::SyncCapability),
            (Failure::SetMasterStream, FaultStage::SetMasterStream),
            (Failure::SetInterleaving, FaultStage::SetInterleaving),
        ] {
            let mut framework = ScriptedFramework::new()
                .with_camera("cam")
                .with_microphone("mic")
                .fail(failure);
            let mut graph =
                PipelineGraph::assemble(&mut framework, Path::new("s.avi"), ContainerFormat::Avi).unwrap();
            let (video, audio) = bind_both(&mut graph);

            let err = coordinate(&mut graph, &video, &audio, InterleavingMode::Capture).unwrap_err();
            assert_eq!(err.stage(), Some(stage));
        }
    }
}
