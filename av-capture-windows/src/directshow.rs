//! DirectShow implementation of `CaptureFramework`.
//!
//! Capture devices become source filters, `ICaptureGraphBuilder2` wires
//! their capture pins into an AVI multiplexer feeding a file writer, and
//! `ControlStream` schedules each stream's start and stop on the graph
//! clock. Completion surfaces through the graph's `IMediaEvent` queue.

use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use log::{debug, info, warn};
use windows::core::*;
use windows::Win32::Foundation::{E_INVALIDARG, E_POINTER};
use windows::Win32::Media::DirectShow::*;
use windows::Win32::System::Com::*;

use av_capture_core::models::config::{ContainerFormat, InterleavingMode};
use av_capture_core::models::device::{DeviceCategory, SourceDescriptor};
use av_capture_core::models::error::FrameworkFault;
use av_capture_core::models::event::{CompletionToken, GraphEvent};
use av_capture_core::models::timing::StreamWindow;
use av_capture_core::traits::capture_framework::{CaptureFramework, MuxSyncControl};

use crate::com::ComApartment;
use crate::device_enumerator::{DeviceEnumerator, DirectShowDevice};
use crate::guids;

fn fault(operation: &'static str) -> impl FnOnce(Error) -> FrameworkFault {
    move |e| FrameworkFault::new(operation, e.code().0, e.message())
}

/// The COM objects making up one capture graph.
struct FilterGraph {
    builder: ICaptureGraphBuilder2,
    graph: IGraphBuilder,
    control: IMediaControl,
    events: IMediaEvent,
}

impl FilterGraph {
    fn create() -> std::result::Result<Self, FrameworkFault> {
        unsafe {
            let builder: ICaptureGraphBuilder2 =
                CoCreateInstance(&guids::CLSID_CAPTURE_GRAPH_BUILDER2, None, CLSCTX_INPROC_SERVER)
                    .map_err(fault("CoCreateInstance(CaptureGraphBuilder2)"))?;
            let graph: IGraphBuilder = CoCreateInstance(&guids::CLSID_FILTER_GRAPH, None, CLSCTX_INPROC_SERVER)
                .map_err(fault("CoCreateInstance(FilterGraph)"))?;
            builder.SetFiltergraph(&graph).map_err(fault("SetFiltergraph"))?;

            let control: IMediaControl = graph.cast().map_err(fault("QueryInterface(IMediaControl)"))?;
            let events: IMediaEvent = graph.cast().map_err(fault("QueryInterface(IMediaEvent)"))?;

            Ok(Self {
                builder,
                graph,
                control,
                events,
            })
        }
    }
}

/// DirectShow capture framework.
///
/// `initialize` enters a single-threaded COM apartment on the calling
/// thread, so the framework must stay on that thread until
/// `uninitialize`.
pub struct DirectShowFramework {
    // Field order matters: COM objects must drop before the apartment.
    graph: Option<FilterGraph>,
    devices: Option<DeviceEnumerator>,
    apartment: ComApartment,
}

impl DirectShowFramework {
    pub fn new() -> Self {
        Self {
            graph: None,
            devices: None,
            apartment: ComApartment::new(),
        }
    }

    fn current(&self, operation: &'static str) -> std::result::Result<&FilterGraph, FrameworkFault> {
        self.graph
            .as_ref()
            .ok_or_else(|| FrameworkFault::new(operation, E_POINTER.0, "no filter graph"))
    }
}

impl Default for DirectShowFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureFramework for DirectShowFramework {
    type Device = DirectShowDevice;
    type Node = IBaseFilter;
    type Mux = IBaseFilter;
    type SyncControl = AviMuxSync;

    fn initialize(&mut self) -> std::result::Result<(), FrameworkFault> {
        self.apartment.enter()
    }

    fn uninitialize(&mut self) {
        self.graph = None;
        self.devices = None;
        self.apartment.leave();
    }

    fn enumerate(&mut self, category: DeviceCategory) -> std::result::Result<Vec<DirectShowDevice>, FrameworkFault> {
        if self.devices.is_none() {
            self.devices = Some(DeviceEnumerator::new()?);
        }
        let Some(devices) = self.devices.as_ref() else {
            return Ok(Vec::new());
        };

        let found = devices.list(category)?;
        for device in &found {
            debug!("Found {} device: {}", category, device.name);
        }
        Ok(found)
    }

    fn bind_device(&mut self, device: DirectShowDevice) -> std::result::Result<IBaseFilter, FrameworkFault> {
        unsafe {
            let filter: IBaseFilter = device
                .moniker
                .BindToObject(None, None)
                .map_err(fault("BindToObject"))?;
            info!("Bound capture device: {}", device.name);
            Ok(filter)
        }
    }

    fn create_graph(&mut self) -> std::result::Result<(), FrameworkFault> {
        self.graph = Some(FilterGraph::create()?);
        Ok(())
    }

    fn create_mux_and_sink(
        &mut self,
        output: &Path,
        format: ContainerFormat,
    ) -> std::result::Result<IBaseFilter, FrameworkFault> {
        let graph = self.current("SetOutputFileName")?;
        let subtype = match format {
            ContainerFormat::Avi => &guids::MEDIASUBTYPE_AVI,
        };
        let wide: Vec<u16> = output.as_os_str().encode_wide().chain(std::iter::once(0)).collect();

        unsafe {
            let mut mux: Option<IBaseFilter> = None;
            graph
                .builder
                .SetOutputFileName(subtype, PCWSTR(wide.as_ptr()), &mut mux, std::ptr::null_mut())
                .map_err(fault("SetOutputFileName"))?;
            mux.ok_or_else(|| FrameworkFault::new("SetOutputFileName", E_POINTER.0, "no multiplexer returned"))
        }
    }

    fn add_node(&mut self, node: &IBaseFilter, name: &str) -> std::result::Result<(), FrameworkFault> {
        let graph = self.current("AddFilter")?;
        unsafe {
            graph
                .graph
                .AddFilter(node, &HSTRING::from(name))
                .map_err(fault("AddFilter"))
        }
    }

    fn remove_node(&mut self, node: &IBaseFilter) {
        if let Some(graph) = self.graph.as_ref() {
            if let Err(e) = unsafe { graph.graph.RemoveFilter(node) } {
                warn!("RemoveFilter failed: {}", e);
            }
        }
    }

    fn connect(
        &mut self,
        node: &IBaseFilter,
        source: &SourceDescriptor,
        mux: &IBaseFilter,
    ) -> std::result::Result<(), FrameworkFault> {
        let graph = self.current("RenderStream")?;
        unsafe {
            graph
                .builder
                .RenderStream(
                    &guids::PIN_CATEGORY_CAPTURE,
                    guids::major_type(source.media_type),
                    node,
                    None,
                    mux,
                )
                .map_err(fault("RenderStream"))
        }
    }

    fn schedule_stream_window(
        &mut self,
        node: &IBaseFilter,
        source: &SourceDescriptor,
        window: StreamWindow,
        token: CompletionToken,
    ) -> std::result::Result<(), FrameworkFault> {
        let graph = self.current("ControlStream")?;
        let start = window.start.ticks();
        let stop = window.stop.ticks();
        unsafe {
            graph
                .builder
                .ControlStream(
                    &guids::PIN_CATEGORY_CAPTURE,
                    guids::major_type(source.media_type),
                    node,
                    &start,
                    &stop,
                    token.start_cookie,
                    token.stop_cookie,
                )
                .map_err(fault("ControlStream"))
        }
    }

    fn sync_control(&mut self, mux: &IBaseFilter) -> std::result::Result<AviMuxSync, FrameworkFault> {
        let avi: IConfigAviMux = mux.cast().map_err(fault("QueryInterface(IConfigAviMux)"))?;
        let interleaving: IConfigInterleaving = mux.cast().map_err(fault("QueryInterface(IConfigInterleaving)"))?;
        Ok(AviMuxSync { avi, interleaving })
    }

    fn run(&mut self) -> std::result::Result<(), FrameworkFault> {
        let graph = self.current("Run")?;
        unsafe { graph.control.Run().map_err(fault("Run")) }
    }

    fn stop(&mut self) -> std::result::Result<(), FrameworkFault> {
        let graph = self.current("Stop")?;
        unsafe { graph.control.Stop().map_err(fault("Stop")) }
    }

    fn poll_event(&mut self, timeout_ms: u32) -> Option<GraphEvent> {
        let graph = self.graph.as_ref()?;
        let mut code = 0i32;
        let mut param1 = 0isize;
        let mut param2 = 0isize;
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);

        // E_ABORT means the queue stayed empty for the whole timeout.
        unsafe {
            graph
                .events
                .GetEvent(&mut code, &mut param1, &mut param2, timeout)
                .ok()?;
        }
        Some(GraphEvent::new(code, param1, param2))
    }

    fn release_event(&mut self, event: &GraphEvent) {
        if let Some(graph) = self.graph.as_ref() {
            if let Err(e) = unsafe { graph.events.FreeEventParams(event.code, event.param1, event.param2) } {
                debug!("FreeEventParams failed for event {:#x}: {}", event.code, e);
            }
        }
    }

    fn release_graph(&mut self) {
        self.graph = None;
    }
}

/// `IConfigAviMux` and `IConfigInterleaving` of the AVI multiplexer.
pub struct AviMuxSync {
    avi: IConfigAviMux,
    interleaving: IConfigInterleaving,
}

impl MuxSyncControl for AviMuxSync {
    fn set_master_stream(&mut self, stream_index: u32) -> std::result::Result<(), FrameworkFault> {
        let stream = i32::try_from(stream_index)
            .map_err(|_| FrameworkFault::new("SetMasterStream", E_INVALIDARG.0, "stream index out of range"))?;
        unsafe { self.avi.SetMasterStream(stream).map_err(fault("SetMasterStream")) }
    }

    fn set_interleaving(&mut self, mode: InterleavingMode) -> std::result::Result<(), FrameworkFault> {
        let mode = match mode {
            InterleavingMode::None => INTERLEAVE_NONE,
            InterleavingMode::Capture => INTERLEAVE_CAPTURE,
            InterleavingMode::Full => INTERLEAVE_FULL,
            InterleavingMode::NoneBuffered => INTERLEAVE_NONE_BUFFERED,
        };
        unsafe { self.interleaving.SetMode(mode).map_err(fault("put_Mode")) }
    }
}
