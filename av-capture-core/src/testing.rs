//! Scripted in-memory capture framework for exercising the recorder
//! without camera, microphone, or a real filter graph.
//!
//! Every call is journaled. Device catalogs, failures, and the event
//! queue are set up front:
//!
//! ```
//! use av_capture_core::testing::{Failure, ScriptedFramework};
//! use av_capture_core::DeviceCategory;
//!
//! let framework = ScriptedFramework::new()
//!     .with_camera("front")
//!     .with_microphone("headset")
//!     .fail(Failure::Connect(DeviceCategory::Audio));
//! let handle = framework.handle();
//! # let _ = (framework, handle);
//! ```
//!
//! Unless `with_events` is used, running the graph queues one
//! stream-started and one stream-stopped event per scheduled stream,
//! carrying the scheduled cookies.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::{ContainerFormat, InterleavingMode};
use crate::models::device::{DeviceCategory, MediaType, SourceDescriptor};
use crate::models::error::FrameworkFault;
use crate::models::event::{CompletionToken, EventCode, GraphEvent};
use crate::models::timing::StreamWindow;
use crate::traits::capture_framework::{CaptureFramework, MuxSyncControl};

/// Status code used for every scripted failure.
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

/// A journaled framework call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize,
    Uninitialize,
    Enumerate(DeviceCategory),
    BindDevice(String),
    CreateGraph,
    CreateMux { output: PathBuf, format: ContainerFormat },
    AddNode(String),
    RemoveNode(String),
    Connect { node: String, media_type: MediaType },
    Schedule { node: String, window: StreamWindow, token: CompletionToken },
    SyncControl,
    SetMasterStream(u32),
    SetInterleaving(InterleavingMode),
    Run,
    Stop,
    ReleaseEvent(GraphEvent),
    ReleaseGraph,
}

/// A call that should fail when reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failure {
    Initialize,
    Enumerate(DeviceCategory),
    CreateGraph,
    CreateMux,
    AddNode(DeviceCategory),
    Connect(DeviceCategory),
    Schedule(DeviceCategory),
    SyncCapability,
    SetMasterStream,
    SetInterleaving,
    Run,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedDevice {
    pub name: String,
    pub category: DeviceCategory,
    pub bindable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedNode {
    pub name: String,
    pub category: DeviceCategory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedMux {
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
enum EventScript {
    Automatic,
    Fixed(Vec<GraphEvent>),
}

#[derive(Debug, Default)]
struct ScriptState {
    calls: Vec<Call>,
    failures: HashSet<Failure>,
    runtime_depth: i32,
    graph_live: bool,
    running: bool,
    graph_nodes: Vec<String>,
    scheduled: Vec<(String, CompletionToken)>,
    queue: VecDeque<GraphEvent>,
    outstanding: Vec<GraphEvent>,
    dequeued: usize,
    released: usize,
    double_releases: usize,
    graph_releases: usize,
}

impl ScriptState {
    fn check(&mut self, failure: Failure, operation: &'static str) -> Result<(), FrameworkFault> {
        if self.failures.contains(&failure) {
            Err(FrameworkFault::new(operation, E_FAIL, "scripted failure"))
        } else {
            Ok(())
        }
    }
}

/// In-memory `CaptureFramework`.
pub struct ScriptedFramework {
    devices: Vec<ScriptedDevice>,
    events: EventScript,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedFramework {
    /// A framework with no devices at all.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            events: EventScript::Automatic,
            state: Arc::new(Mutex::new(ScriptState::default())),
        }
    }

    pub fn with_camera(self, name: &str) -> Self {
        self.with_device(DeviceCategory::Video, name, true)
    }

    pub fn with_microphone(self, name: &str) -> Self {
        self.with_device(DeviceCategory::Audio, name, true)
    }

    /// A device that enumerates but cannot be turned into a node.
    pub fn with_unbindable(self, category: DeviceCategory, name: &str) -> Self {
        self.with_device(category, name, false)
    }

    /// Replace the automatic stream events with a fixed queue, delivered
    /// once the graph runs.
    pub fn with_events(mut self, events: Vec<GraphEvent>) -> Self {
        self.events = EventScript::Fixed(events);
        self
    }

    pub fn fail(self, failure: Failure) -> Self {
        self.state.lock().failures.insert(failure);
        self
    }

    /// Inspection handle that stays valid after the framework is moved
    /// into a session.
    pub fn handle(&self) -> ScriptHandle {
        ScriptHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// A node not produced by enumeration, for driving the graph directly.
    pub fn node(&self, name: &str, category: DeviceCategory) -> ScriptedNode {
        ScriptedNode {
            name: name.to_string(),
            category,
        }
    }

    fn with_device(mut self, category: DeviceCategory, name: &str, bindable: bool) -> Self {
        self.devices.push(ScriptedDevice {
            name: name.to_string(),
            category,
            bindable,
        });
        self
    }
}

impl Default for ScriptedFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureFramework for ScriptedFramework {
    type Device = ScriptedDevice;
    type Node = ScriptedNode;
    type Mux = ScriptedMux;
    type SyncControl = ScriptedSyncControl;

    fn initialize(&mut self) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.check(Failure::Initialize, "Initialize")?;
        s.calls.push(Call::Initialize);
        s.runtime_depth += 1;
        Ok(())
    }

    fn uninitialize(&mut self) {
        let mut s = self.state.lock();
        s.calls.push(Call::Uninitialize);
        s.runtime_depth -= 1;
    }

    fn enumerate(&mut self, category: DeviceCategory) -> Result<Vec<ScriptedDevice>, FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::Enumerate(category));
        s.check(Failure::Enumerate(category), "Enumerate")?;
        Ok(self
            .devices
            .iter()
            .filter(|d| d.category == category)
            .cloned()
            .collect())
    }

    fn bind_device(&mut self, device: ScriptedDevice) -> Result<ScriptedNode, FrameworkFault> {
        self.state.lock().calls.push(Call::BindDevice(device.name.clone()));
        if !device.bindable {
            return Err(FrameworkFault::new("BindToObject", E_FAIL, "device cannot be bound"));
        }
        Ok(ScriptedNode {
            name: device.name,
            category: device.category,
        })
    }

    fn create_graph(&mut self) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::CreateGraph);
        s.check(Failure::CreateGraph, "CreateGraph")?;
        s.graph_live = true;
        s.running = false;
        s.graph_nodes.clear();
        s.scheduled.clear();
        s.queue.clear();
        Ok(())
    }

    fn create_mux_and_sink(&mut self, output: &Path, format: ContainerFormat) -> Result<ScriptedMux, FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::CreateMux {
            output: output.to_path_buf(),
            format,
        });
        s.check(Failure::CreateMux, "SetOutputFileName")?;
        if !s.graph_live {
            return Err(FrameworkFault::new("SetOutputFileName", E_FAIL, "no graph"));
        }
        Ok(ScriptedMux {
            output: output.to_path_buf(),
        })
    }

    fn add_node(&mut self, node: &ScriptedNode, _name: &str) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::AddNode(node.name.clone()));
        s.check(Failure::AddNode(node.category), "AddNode")?;
        if !s.graph_live || s.running {
            return Err(FrameworkFault::new("AddNode", E_FAIL, "graph not accepting nodes"));
        }
        s.graph_nodes.push(node.name.clone());
        Ok(())
    }

    fn remove_node(&mut self, node: &ScriptedNode) {
        let mut s = self.state.lock();
        s.calls.push(Call::RemoveNode(node.name.clone()));
        s.graph_nodes.retain(|n| *n != node.name);
    }

    fn connect(
        &mut self,
        node: &ScriptedNode,
        source: &SourceDescriptor,
        _mux: &ScriptedMux,
    ) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::Connect {
            node: node.name.clone(),
            media_type: source.media_type,
        });
        s.check(Failure::Connect(node.category), "Connect")?;
        if !s.graph_nodes.contains(&node.name) {
            return Err(FrameworkFault::new("Connect", E_FAIL, "node is not in the graph"));
        }
        Ok(())
    }

    fn schedule_stream_window(
        &mut self,
        node: &ScriptedNode,
        _source: &SourceDescriptor,
        window: StreamWindow,
        token: CompletionToken,
    ) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::Schedule {
            node: node.name.clone(),
            window,
            token,
        });
        s.check(Failure::Schedule(node.category), "ControlStream")?;
        s.scheduled.push((node.name.clone(), token));
        Ok(())
    }

    fn sync_control(&mut self, _mux: &ScriptedMux) -> Result<ScriptedSyncControl, FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::SyncControl);
        s.check(Failure::SyncCapability, "QueryInterface")?;
        Ok(ScriptedSyncControl {
            state: Arc::clone(&self.state),
        })
    }

    fn run(&mut self) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::Run);
        s.check(Failure::Run, "Run")?;
        s.running = true;

        let events = match &self.events {
            EventScript::Fixed(events) => events.clone(),
            EventScript::Automatic => {
                let started = s.scheduled.iter().map(|(_, token)| {
                    GraphEvent::new(EventCode::STREAM_CONTROL_STARTED, 0, token.start_cookie as isize)
                });
                let stopped = s.scheduled.iter().map(|(_, token)| {
                    GraphEvent::new(EventCode::STREAM_CONTROL_STOPPED, 0, token.stop_cookie as isize)
                });
                started.chain(stopped).collect()
            }
        };
        s.queue.extend(events);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::Stop);
        s.running = false;
        s.check(Failure::Stop, "Stop")
    }

    fn poll_event(&mut self, _timeout_ms: u32) -> Option<GraphEvent> {
        let mut s = self.state.lock();
        let event = s.queue.pop_front()?;
        s.dequeued += 1;
        s.outstanding.push(event);
        Some(event)
    }

    fn release_event(&mut self, event: &GraphEvent) {
        let mut s = self.state.lock();
        s.calls.push(Call::ReleaseEvent(*event));
        match s.outstanding.iter().position(|e| e == event) {
            Some(position) => {
                s.outstanding.remove(position);
                s.released += 1;
            }
            None => s.double_releases += 1,
        }
    }

    fn release_graph(&mut self) {
        let mut s = self.state.lock();
        if !s.graph_live {
            return;
        }
        s.calls.push(Call::ReleaseGraph);
        s.graph_live = false;
        s.running = false;
        s.graph_nodes.clear();
        s.graph_releases += 1;
    }
}

/// Sync control handed out by `ScriptedFramework::sync_control`.
pub struct ScriptedSyncControl {
    state: Arc<Mutex<ScriptState>>,
}

impl MuxSyncControl for ScriptedSyncControl {
    fn set_master_stream(&mut self, stream_index: u32) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::SetMasterStream(stream_index));
        s.check(Failure::SetMasterStream, "SetMasterStream")
    }

    fn set_interleaving(&mut self, mode: InterleavingMode) -> Result<(), FrameworkFault> {
        let mut s = self.state.lock();
        s.calls.push(Call::SetInterleaving(mode));
        s.check(Failure::SetInterleaving, "put_Mode")
    }
}

/// Read-only view of a `ScriptedFramework`'s journal and graph.
#[derive(Clone)]
pub struct ScriptHandle {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptHandle {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn initialize_count(&self) -> usize {
        self.count(|c| *c == Call::Initialize)
    }

    pub fn uninitialize_count(&self) -> usize {
        self.count(|c| *c == Call::Uninitialize)
    }

    /// Initializations minus uninitializations.
    pub fn runtime_depth(&self) -> i32 {
        self.state.lock().runtime_depth
    }

    pub fn graph_creations(&self) -> usize {
        self.count(|c| *c == Call::CreateGraph)
    }

    pub fn graph_releases(&self) -> usize {
        self.state.lock().graph_releases
    }

    pub fn is_graph_live(&self) -> bool {
        self.state.lock().graph_live
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Names of the capture nodes currently in the graph.
    pub fn graph_nodes(&self) -> Vec<String> {
        self.state.lock().graph_nodes.clone()
    }

    pub fn events_dequeued(&self) -> usize {
        self.state.lock().dequeued
    }

    pub fn events_released(&self) -> usize {
        self.state.lock().released
    }

    /// Releases of events that were not outstanding.
    pub fn double_releases(&self) -> usize {
        self.state.lock().double_releases
    }

    /// Dequeued events not yet released.
    pub fn outstanding_events(&self) -> Vec<GraphEvent> {
        self.state.lock().outstanding.clone()
    }

    /// Events still waiting in the queue.
    pub fn queued_events(&self) -> usize {
        self.state.lock().queue.len()
    }
}
