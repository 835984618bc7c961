use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::binding::{BindOutcome, StreamBinding};
use crate::models::config::RecorderConfig;
use crate::models::device::DeviceCategory;
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::RecorderState;
use crate::storage::{checksum, metadata};
use crate::traits::capture_framework::CaptureFramework;
use crate::traits::recording_delegate::RecordingDelegate;

use super::binder;
use super::graph::PipelineGraph;
use super::scope::FrameworkScope;
use super::sync::{self, SyncPlan};

/// Publishes state transitions to the shared state cell and the delegate.
struct StateTracker {
    state: Arc<Mutex<RecorderState>>,
    delegate: Option<Arc<dyn RecordingDelegate>>,
}

impl StateTracker {
    fn set(&self, state: RecorderState) {
        log::debug!("recorder state: {:?}", state);
        *self.state.lock() = state.clone();
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&state);
        }
    }

    fn source_missing(&self, category: DeviceCategory) {
        log::info!("No {} available", category.device_label());
        if let Some(ref delegate) = self.delegate {
            delegate.on_source_missing(category);
        }
    }
}

/// What the graph phase of `record` hands back once the graph is released.
struct CaptureRun {
    streams: Vec<StreamBinding>,
    sync: Option<SyncPlan>,
    events_consumed: usize,
}

/// One recording session: a fixed output path and the framework runtime
/// it owns.
///
/// ```text
/// [camera] ──┐
///            ├→ [multiplexer] → [file sink] → output
/// [mic] ─────┘
/// ```
///
/// The framework runtime is acquired in the constructor and released when
/// the session is dropped. Each `record` call builds, runs, and releases
/// its own graph.
pub struct RecordingSession<F: CaptureFramework> {
    output_file_name: PathBuf,
    config: RecorderConfig,
    tracker: StateTracker,
    scope: FrameworkScope<F>,
}

impl<F: CaptureFramework> RecordingSession<F> {
    pub fn new(framework: F, output_file_name: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        Self::with_config(framework, output_file_name, RecorderConfig::default())
    }

    pub fn with_config(
        framework: F,
        output_file_name: impl Into<PathBuf>,
        config: RecorderConfig,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        let scope = FrameworkScope::enter(framework)?;

        Ok(Self {
            output_file_name: output_file_name.into(),
            config,
            tracker: StateTracker {
                state: Arc::new(Mutex::new(RecorderState::Idle)),
                delegate: None,
            },
            scope,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecordingDelegate>) {
        self.tracker.delegate = Some(delegate);
    }

    pub fn output_file_name(&self) -> &Path {
        &self.output_file_name
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn state(&self) -> RecorderState {
        self.tracker.state.lock().clone()
    }

    /// Shared handle to the state cell, for observers that outlive a borrow
    /// of the session.
    pub fn state_handle(&self) -> Arc<Mutex<RecorderState>> {
        Arc::clone(&self.tracker.state)
    }

    pub fn framework(&self) -> &F {
        self.scope.framework()
    }

    /// Record `duration_secs` seconds from the first camera and first
    /// microphone into the output file. Blocks until the scheduled stop
    /// notification arrives.
    ///
    /// Transitions: idle → graph_assembling → running → draining → stopped,
    /// or → failed on any fatal error.
    pub fn record(&mut self, duration_secs: u32) -> Result<RecordingResult, CaptureError> {
        if duration_secs == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "recording duration must be at least one second".into(),
            ));
        }

        match self.capture(duration_secs).and_then(|run| self.finalize(duration_secs, run)) {
            Ok(result) => {
                self.tracker.set(RecorderState::Stopped);
                if let Some(ref delegate) = self.tracker.delegate {
                    delegate.on_recording_finished(&result);
                }
                Ok(result)
            }
            Err(err) => {
                log::error!("recording failed: {}", err);
                self.tracker.set(RecorderState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Assemble, run, and drain the graph. The graph is released when this
    /// returns, on every path.
    fn capture(&mut self, duration_secs: u32) -> Result<CaptureRun, CaptureError> {
        let token = self.config.completion_token;

        self.tracker.set(RecorderState::GraphAssembling);
        let mut graph = PipelineGraph::assemble(
            self.scope.framework_mut(),
            &self.output_file_name,
            self.config.container,
        )?;

        let mut streams = Vec::with_capacity(DeviceCategory::BIND_ORDER.len());
        let mut missing = Vec::new();
        for category in DeviceCategory::BIND_ORDER {
            match binder::bind(&mut graph, &category.descriptor(), duration_secs, token)? {
                BindOutcome::Bound(binding) => streams.push(binding),
                BindOutcome::Unavailable => missing.push(category),
            }
        }

        if streams.is_empty() {
            return Err(CaptureError::NoSources);
        }
        for category in missing {
            self.tracker.source_missing(category);
        }

        let sync = match streams.as_slice() {
            [video, audio] => Some(sync::coordinate(&mut graph, video, audio, self.config.interleaving)?),
            _ => None,
        };

        graph.run()?;
        self.tracker.set(RecorderState::Running);
        log::info!(
            "recording {}s of {} to {}",
            duration_secs,
            describe_streams(&streams),
            self.output_file_name.display()
        );

        let events_consumed = graph.wait_for_stop(token, self.config.completion_timeout)?;

        self.tracker.set(RecorderState::Draining);
        graph.stop();

        Ok(CaptureRun {
            streams,
            sync,
            events_consumed,
        })
    }

    fn finalize(&self, duration_secs: u32, run: CaptureRun) -> Result<RecordingResult, CaptureError> {
        let path = &self.output_file_name;
        let written = path.exists();
        if !written {
            log::warn!("output file {} was not created", path.display());
        }

        let checksum = if !self.config.compute_checksum || !written {
            None
        } else {
            match checksum::sha256_file(path) {
                Ok(digest) => Some(digest),
                Err(e) => {
                    log::warn!("could not checksum {}: {}", path.display(), e);
                    None
                }
            }
        };

        let metadata = RecordingMetadata::new(
            &path.to_string_lossy(),
            duration_secs,
            self.config.container,
            &run.streams,
            run.sync.map(|s| s.master),
            run.sync.map(|s| s.interleaving),
            checksum.clone(),
        );

        if self.config.write_metadata && written {
            metadata::write_metadata(&metadata, path)?;
        } else if self.config.write_metadata {
            log::warn!("skipping metadata for missing output {}", path.display());
        }

        Ok(RecordingResult {
            file_path: path.clone(),
            duration_secs,
            synchronized: run.sync.is_some(),
            streams: run.streams,
            events_consumed: run.events_consumed,
            checksum,
            metadata,
        })
    }
}

fn describe_streams(streams: &[StreamBinding]) -> String {
    streams
        .iter()
        .map(|s| s.category.device_label())
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFramework;

    #[test]
    fn zero_duration_is_rejected_before_touching_the_graph() {
        let framework = ScriptedFramework::new().with_camera("cam");
        let handle = framework.handle();
        let mut session = RecordingSession::new(framework, "zero.avi").unwrap();

        let err = session.record(0).unwrap_err();

        assert!(matches!(err, CaptureError::InvalidConfiguration(_)));
        assert_eq!(handle.graph_creations(), 0);
        assert!(session.state().is_idle());
    }

    #[test]
    fn state_handle_tracks_the_session_state() {
        let framework = ScriptedFramework::new().with_microphone("mic");
        let mut session = RecordingSession::new(framework, "handle.avi").unwrap();
        let observer = session.state_handle();
        assert!(observer.lock().is_idle());

        session.record(1).unwrap();

        let observed = observer.lock().clone();
        assert!(observed.is_terminal());
        assert!(!observed.is_running());
        assert_eq!(observed, session.state());
    }

    #[test]
    fn config_and_framework_are_exposed_read_only() {
        let config = RecorderConfig {
            completion_timeout: Some(std::time::Duration::from_secs(3)),
            ..Default::default()
        };
        let session = RecordingSession::with_config(ScriptedFramework::new(), "cfg.avi", config).unwrap();

        assert_eq!(session.config().completion_timeout, Some(std::time::Duration::from_secs(3)));
        assert_eq!(session.framework().handle().initialize_count(), 1);
    }

    #[test]
    fn output_file_name_is_fixed_at_construction() {
        let session = RecordingSession::new(ScriptedFramework::new(), "record.avi").unwrap();
        assert_eq!(session.output_file_name(), Path::new("record.avi"));
    }

    #[test]
    fn invalid_config_never_initializes_framework() {
        let framework = ScriptedFramework::new();
        let handle = framework.handle();
        let config = RecorderConfig {
            completion_token: crate::models::event::CompletionToken {
                start_cookie: 1,
                stop_cookie: 1,
            },
            ..Default::default()
        };

        assert!(RecordingSession::with_config(framework, "x.avi", config).is_err());
        assert_eq!(handle.initialize_count(), 0);
    }

    #[test]
    fn describes_streams_by_device() {
        let window = crate::models::timing::StreamWindow::for_duration(1);
        let token = crate::models::event::CompletionToken::RECORDING;
        let streams = [
            StreamBinding {
                category: DeviceCategory::Video,
                stream_index: 0,
                window,
                token,
            },
            StreamBinding {
                category: DeviceCategory::Audio,
                stream_index: 1,
                window,
                token,
            },
        ];
        assert_eq!(describe_streams(&streams), "camera + microphone");
    }
}
