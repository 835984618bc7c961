use std::path::Path;

use crate::models::config::{ContainerFormat, InterleavingMode};
use crate::models::device::{DeviceCategory, SourceDescriptor};
use crate::models::error::FrameworkFault;
use crate::models::event::{CompletionToken, GraphEvent};
use crate::models::timing::StreamWindow;

/// Multimedia framework that owns device catalogs, the filter graph,
/// transport control, and the event queue.
///
/// Implemented by:
/// - `DirectShowFramework` (Windows)
/// - `ScriptedFramework` (in-memory, for tests)
///
/// The framework holds at most one graph at a time. `create_graph`
/// starts a fresh one; `release_graph` drops it together with every node
/// bound into it and is a no-op when no graph exists.
pub trait CaptureFramework {
    /// An enumerated physical device, not yet part of any graph.
    type Device;
    /// A capture node created from a device.
    type Node;
    /// The multiplexer node feeding the file sink.
    type Mux;
    /// The multiplexer's synchronization settings.
    type SyncControl: MuxSyncControl;

    /// Acquire the per-session runtime. Paired with exactly one
    /// `uninitialize`.
    fn initialize(&mut self) -> Result<(), FrameworkFault>;

    fn uninitialize(&mut self);

    /// Devices in `category`, in catalog order. May be empty.
    fn enumerate(&mut self, category: DeviceCategory) -> Result<Vec<Self::Device>, FrameworkFault>;

    fn bind_device(&mut self, device: Self::Device) -> Result<Self::Node, FrameworkFault>;

    fn create_graph(&mut self) -> Result<(), FrameworkFault>;

    /// Create the multiplexer and a file sink writing `output`, wired
    /// together inside the current graph.
    fn create_mux_and_sink(&mut self, output: &Path, format: ContainerFormat) -> Result<Self::Mux, FrameworkFault>;

    fn add_node(&mut self, node: &Self::Node, name: &str) -> Result<(), FrameworkFault>;

    fn remove_node(&mut self, node: &Self::Node);

    /// Connect the node's capture pin for `source.media_type` to the next
    /// free multiplexer input.
    fn connect(&mut self, node: &Self::Node, source: &SourceDescriptor, mux: &Self::Mux) -> Result<(), FrameworkFault>;

    /// Register a start/stop window for the node's capture stream. Takes
    /// effect only once the graph runs.
    fn schedule_stream_window(
        &mut self,
        node: &Self::Node,
        source: &SourceDescriptor,
        window: StreamWindow,
        token: CompletionToken,
    ) -> Result<(), FrameworkFault>;

    fn sync_control(&mut self, mux: &Self::Mux) -> Result<Self::SyncControl, FrameworkFault>;

    fn run(&mut self) -> Result<(), FrameworkFault>;

    fn stop(&mut self) -> Result<(), FrameworkFault>;

    /// Dequeue one event, waiting at most `timeout_ms`. `None` when the
    /// queue is empty.
    fn poll_event(&mut self, timeout_ms: u32) -> Option<GraphEvent>;

    /// Free whatever the framework attached to a dequeued event.
    fn release_event(&mut self, event: &GraphEvent);

    fn release_graph(&mut self);
}

/// Synchronization settings of a multiplexer.
pub trait MuxSyncControl {
    /// Make the stream at `stream_index` the timing reference.
    fn set_master_stream(&mut self, stream_index: u32) -> Result<(), FrameworkFault>;

    fn set_interleaving(&mut self, mode: InterleavingMode) -> Result<(), FrameworkFault>;
}
