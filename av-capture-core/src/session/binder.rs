use crate::models::binding::{BindOutcome, StreamBinding};
use crate::models::device::SourceDescriptor;
use crate::models::error::{CaptureError, FaultStage};
use crate::models::event::CompletionToken;
use crate::traits::capture_framework::CaptureFramework;

use super::graph::PipelineGraph;
use super::locator;
use super::scheduler;

/// Locate a device for `source`, add it to the graph, connect it to the
/// multiplexer, and schedule its stream window.
///
/// A missing device is `Ok(BindOutcome::Unavailable)`. Once a device has
/// been found every further failure is fatal, and a node that was already
/// added is removed again before the error is returned.
pub fn bind<F: CaptureFramework>(
    graph: &mut PipelineGraph<'_, F>,
    source: &SourceDescriptor,
    duration_secs: u32,
    token: CompletionToken,
) -> Result<BindOutcome, CaptureError> {
    let category = source.category;

    let Some(node) = locator::locate(graph.framework(), category) else {
        return Ok(BindOutcome::Unavailable);
    };

    let stream_index = graph.add_capture_node(&node, category)?;

    if let Err(e) = graph.connect(&node, source) {
        graph.remove_capture_node(&node, category);
        return Err(CaptureError::fault(FaultStage::Connect, Some(category), e));
    }

    let window = match scheduler::schedule(graph.framework(), &node, source, duration_secs, token) {
        Ok(window) => window,
        Err(e) => {
            graph.remove_capture_node(&node, category);
            return Err(CaptureError::fault(FaultStage::Schedule, Some(category), e));
        }
    };

    log::info!("{} bound as stream {}", category.device_label(), stream_index);

    Ok(BindOutcome::Bound(StreamBinding {
        category,
        stream_index,
        window,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::models::config::ContainerFormat;
    use crate::models::device::{DeviceCategory, AUDIO_SOURCE, VIDEO_SOURCE};
    use crate::testing::{Call, Failure, ScriptedFramework};

    fn graph(framework: &mut ScriptedFramework) -> PipelineGraph<'_, ScriptedFramework> {
        PipelineGraph::assemble(framework, Path::new("bind.avi"), ContainerFormat::Avi).unwrap()
    }

    #[test]
    fn missing_device_is_unavailable_not_an_error() {
        let mut framework = ScriptedFramework::new();
        let mut graph = graph(&mut framework);

        let outcome = bind(&mut graph, &VIDEO_SOURCE, 5, CompletionToken::RECORDING).unwrap();
        assert_eq!(outcome, BindOutcome::Unavailable);
        assert!(!outcome.is_bound());
        assert!(graph.categories().is_empty());
    }

    #[test]
    fn bound_stream_records_index_and_window() {
        let mut framework = ScriptedFramework::new().with_camera("cam").with_microphone("mic");
        let mut graph = graph(&mut framework);

        let video = bind(&mut graph, &VIDEO_SOURCE, 5, CompletionToken::RECORDING).unwrap();
        let audio = bind(&mut graph, &AUDIO_SOURCE, 5, CompletionToken::RECORDING).unwrap();

        assert!(video.is_bound() && audio.is_bound());
        let video = video.binding().copied().unwrap();
        let audio = audio.binding().copied().unwrap();
        assert_eq!((video.category, video.stream_index), (DeviceCategory::Video, 0));
        assert_eq!((audio.category, audio.stream_index), (DeviceCategory::Audio, 1));
        assert_eq!(audio.window.stop.ticks(), 50_000_000);
    }

    #[test]
    fn connect_failure_removes_node_before_failing() {
        let mut framework = ScriptedFramework::new()
            .with_camera("cam")
            .fail(Failure::Connect(DeviceCategory::Video));
        let handle = framework.handle();
        let mut graph = graph(&mut framework);

        let err = bind(&mut graph, &VIDEO_SOURCE, 5, CompletionToken::RECORDING).unwrap_err();

        assert_eq!(err.stage(), Some(FaultStage::Connect));
        assert!(graph.categories().is_empty());
        assert!(handle.graph_nodes().is_empty());

        let calls = handle.calls();
        let added = calls.iter().position(|c| *c == Call::AddNode("cam".into())).unwrap();
        let removed = calls.iter().position(|c| *c == Call::RemoveNode("cam".into())).unwrap();
        assert!(added < removed);
    }

    #[test]
    fn schedule_failure_removes_node_before_failing() {
        let mut framework = ScriptedFramework::new()
            .with_microphone("mic")
            .fail(Failure::Schedule(DeviceCategory::Audio));
        let handle = framework.handle();
        let mut graph = graph(&mut framework);

        let err = bind(&mut graph, &AUDIO_SOURCE, 5, CompletionToken::RECORDING).unwrap_err();

        assert_eq!(err.stage(), Some(FaultStage::Schedule));
        assert!(handle.graph_nodes().is_empty());
    }

    #[test]
    fn add_failure_is_fatal() {
        let mut framework = ScriptedFramework::new()
            .with_camera("cam")
            .fail(Failure::AddNode(DeviceCategory::Video));
        let mut graph = graph(&mut framework);

        let err = bind(&mut graph, &VIDEO_SOURCE, 5, CompletionToken::RECORDING).unwrap_err();
        assert_eq!(err.stage(), Some(FaultStage::AddNode));
        assert_eq!(
            err.to_string(),
            "adding capture node failed for camera: AddNode returned 0x80004005: scripted failure"
        );
    }
}
