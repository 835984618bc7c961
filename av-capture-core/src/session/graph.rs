use std::path::Path;
use std::time::{Duration, Instant};

use crate::models::config::ContainerFormat;
use crate::models::device::{DeviceCategory, SourceDescriptor};
use crate::models::error::{CaptureError, FaultStage, FrameworkFault};
use crate::models::event::{CompletionToken, EventCode};
use crate::traits::capture_framework::CaptureFramework;

/// The graph being assembled and run for one `record` call.
///
/// Holds the shared multiplexer and tracks which categories have a
/// capture node. Capture nodes can only be added before `run`, at most
/// one per category. Dropping the graph stops it if it is still running
/// and releases it.
pub struct PipelineGraph<'a, F: CaptureFramework> {
    framework: &'a mut F,
    mux: F::Mux,
    capture_nodes: Vec<DeviceCategory>,
    running: bool,
}

impl<'a, F: CaptureFramework> PipelineGraph<'a, F> {
    /// Create a fresh graph containing the multiplexer and file sink.
    pub fn assemble(framework: &'a mut F, output: &Path, container: ContainerFormat) -> Result<Self, CaptureError> {
        framework
            .create_graph()
            .map_err(|e| CaptureError::fault(FaultStage::CreateGraph, None, e))?;

        let mux = match framework.create_mux_and_sink(output, container) {
            Ok(mux) => mux,
            Err(e) => {
                framework.release_graph();
                return Err(CaptureError::fault(FaultStage::CreateMultiplexer, None, e));
            }
        };

        Ok(Self {
            framework,
            mux,
            capture_nodes: Vec::new(),
            running: false,
        })
    }

    pub fn framework(&mut self) -> &mut F {
        &mut *self.framework
    }

    pub fn mux(&self) -> &F::Mux {
        &self.mux
    }

    /// Categories with a capture node, in multiplexer input order.
    pub fn categories(&self) -> &[DeviceCategory] {
        &self.capture_nodes
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Add a capture node for `category` and return the multiplexer stream
    /// index it will occupy.
    pub fn add_capture_node(&mut self, node: &F::Node, category: DeviceCategory) -> Result<u32, CaptureError> {
        if self.running {
            return Err(CaptureError::GraphInvariant(format!(
                "cannot add a {category} capture node to a running graph"
            )));
        }
        if self.capture_nodes.contains(&category) {
            return Err(CaptureError::GraphInvariant(format!(
                "graph already has a {category} capture node"
            )));
        }

        self.framework
            .add_node(node, node_name(category))
            .map_err(|e| CaptureError::fault(FaultStage::AddNode, Some(category), e))?;

        self.capture_nodes.push(category);
        Ok((self.capture_nodes.len() - 1) as u32)
    }

    pub fn remove_capture_node(&mut self, node: &F::Node, category: DeviceCategory) {
        self.framework.remove_node(node);
        self.capture_nodes.retain(|c| *c != category);
        log::debug!("removed {category} capture node");
    }

    pub fn connect(&mut self, node: &F::Node, source: &SourceDescriptor) -> Result<(), FrameworkFault> {
        self.framework.connect(node, source, &self.mux)
    }

    pub fn sync_control(&mut self) -> Result<F::SyncControl, FrameworkFault> {
        self.framework.sync_control(&self.mux)
    }

    pub fn run(&mut self) -> Result<(), CaptureError> {
        if self.running {
            return Err(CaptureError::GraphInvariant("graph is already running".into()));
        }
        self.framework
            .run()
            .map_err(|e| CaptureError::fault(FaultStage::Run, None, e))?;
        self.running = true;
        Ok(())
    }

    /// Spin on the event queue until an event carrying `token`'s stop
    /// cookie arrives. Returns how many events were dequeued, the stop
    /// event included.
    ///
    /// Every dequeued event is released right after inspection. With no
    /// `timeout` this waits indefinitely.
    pub fn wait_for_stop(&mut self, token: CompletionToken, timeout: Option<Duration>) -> Result<usize, CaptureError> {
        let started = Instant::now();
        let mut consumed = 0usize;

        loop {
            if let Some(event) = self.framework.poll_event(0) {
                consumed += 1;
                let finished = token.is_stop(&event);
                log::debug!(
                    "graph event {:?} ({:#x}, {:#x}){}",
                    event.kind(),
                    event.param1,
                    event.param2,
                    if finished { " - recording finished" } else { "" }
                );
                if matches!(event.kind(), EventCode::ErrorAbort) {
                    log::warn!("pipeline reported an aborting error: {:#x}", event.param1);
                }
                self.framework.release_event(&event);

                if finished {
                    return Ok(consumed);
                }
                continue;
            }

            if let Some(limit) = timeout {
                let waited = started.elapsed();
                if waited >= limit {
                    return Err(CaptureError::CompletionTimeout {
                        waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            }
            std::hint::spin_loop();
        }
    }

    /// Stop the graph if it is running. A failing stop is logged, not
    /// returned: there is nothing left to unwind.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Err(e) = self.framework.stop() {
            log::warn!("stopping pipeline failed: {}", e);
        }
    }
}

impl<F: CaptureFramework> Drop for PipelineGraph<'_, F> {
    fn drop(&mut self) {
        self.stop();
        self.framework.release_graph();
    }
}

fn node_name(category: DeviceCategory) -> &'static str {
    match category {
        DeviceCategory::Video => "Video Capture",
        DeviceCategory::Audio => "Audio Capture",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{EventCode, GraphEvent};
    use crate::testing::{Call, Failure, ScriptedFramework};

    fn unrelated(n: isize) -> GraphEvent {
        GraphEvent::new(EventCode::STREAM_CONTROL_STARTED, n, 0xDEAD)
    }

    fn stop_event() -> GraphEvent {
        GraphEvent::new(EventCode::STREAM_CONTROL_STOPPED, 0, 0xBEEF)
    }

    #[test]
    fn wait_consumes_unrelated_events_then_stop() {
        let mut events: Vec<GraphEvent> = (0..5).map(unrelated).collect();
        events.push(stop_event());
        events.push(unrelated(99));
        let mut framework = ScriptedFramework::new().with_events(events);
        let handle = framework.handle();

        let mut graph = PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi).unwrap();
        graph.run().unwrap();
        let consumed = graph.wait_for_stop(CompletionToken::RECORDING, None).unwrap();

        assert_eq!(consumed, 6);
        assert_eq!(handle.events_dequeued(), 6);
        assert_eq!(handle.events_released(), 6);
        assert!(handle.outstanding_events().is_empty());
        assert_eq!(handle.queued_events(), 1);
    }

    #[test]
    fn wait_times_out_when_stop_never_arrives() {
        let mut framework = ScriptedFramework::new().with_events(vec![unrelated(1)]);
        let handle = framework.handle();

        let mut graph = PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi).unwrap();
        graph.run().unwrap();
        let err = graph
            .wait_for_stop(CompletionToken::RECORDING, Some(Duration::from_millis(20)))
            .unwrap_err();

        match err {
            CaptureError::CompletionTimeout { waited_ms } => assert!(waited_ms >= 20),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(handle.events_released(), 1);
    }

    #[test]
    fn nodes_cannot_be_added_after_run() {
        let mut framework = ScriptedFramework::new().with_camera("cam");
        let node = framework.node("cam", DeviceCategory::Video);

        let mut graph = PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi).unwrap();
        graph.run().unwrap();
        let err = graph.add_capture_node(&node, DeviceCategory::Video).unwrap_err();

        assert!(matches!(err, CaptureError::GraphInvariant(_)));
    }

    #[test]
    fn one_capture_node_per_category() {
        let mut framework = ScriptedFramework::new();
        let first = framework.node("cam-1", DeviceCategory::Video);
        let second = framework.node("cam-2", DeviceCategory::Video);

        let mut graph = PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi).unwrap();
        assert_eq!(graph.add_capture_node(&first, DeviceCategory::Video).unwrap(), 0);
        assert!(graph.add_capture_node(&second, DeviceCategory::Video).is_err());
        assert_eq!(graph.categories(), &[DeviceCategory::Video]);
    }

    #[test]
    fn drop_stops_running_graph_and_releases_it() {
        let mut framework = ScriptedFramework::new();
        let handle = framework.handle();

        {
            let mut graph =
                PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi).unwrap();
            graph.run().unwrap();
            assert!(graph.is_running());
            assert!(handle.is_running());
        }

        assert!(!handle.is_running());
        assert_eq!(handle.count(|c| *c == Call::Stop), 1);
        assert_eq!(handle.graph_releases(), 1);
        assert!(!handle.is_graph_live());
    }

    #[test]
    fn failed_multiplexer_releases_graph() {
        let mut framework = ScriptedFramework::new().fail(Failure::CreateMux);
        let handle = framework.handle();

        let err = PipelineGraph::assemble(&mut framework, Path::new("out.avi"), ContainerFormat::Avi)
            .err()
            .unwrap();

        assert_eq!(err.stage(), Some(FaultStage::CreateMultiplexer));
        assert_eq!(handle.graph_releases(), 1);
    }
}
