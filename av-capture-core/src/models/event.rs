/// Raw notification dequeued from the pipeline's event queue.
///
/// The parameters are framework-owned and must be handed back through
/// `CaptureFramework::release_event` once inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEvent {
    pub code: i32,
    pub param1: isize,
    pub param2: isize,
}

impl GraphEvent {
    pub fn new(code: i32, param1: isize, param2: isize) -> Self {
        Self { code, param1, param2 }
    }

    pub fn kind(&self) -> EventCode {
        EventCode::from(self.code)
    }
}

/// Event codes the recorder knows by name. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    Complete,
    ErrorAbort,
    StreamControlStopped,
    StreamControlStarted,
    Other(i32),
}

impl EventCode {
    pub const COMPLETE: i32 = 0x01;
    pub const ERROR_ABORT: i32 = 0x03;
    pub const STREAM_CONTROL_STOPPED: i32 = 0x1A;
    pub const STREAM_CONTROL_STARTED: i32 = 0x1B;

    pub fn code(self) -> i32 {
        match self {
            Self::Complete => Self::COMPLETE,
            Self::ErrorAbort => Self::ERROR_ABORT,
            Self::StreamControlStopped => Self::STREAM_CONTROL_STOPPED,
            Self::StreamControlStarted => Self::STREAM_CONTROL_STARTED,
            Self::Other(code) => code,
        }
    }
}

impl From<i32> for EventCode {
    fn from(code: i32) -> Self {
        match code {
            Self::COMPLETE => Self::Complete,
            Self::ERROR_ABORT => Self::ErrorAbort,
            Self::STREAM_CONTROL_STOPPED => Self::StreamControlStopped,
            Self::STREAM_CONTROL_STARTED => Self::StreamControlStarted,
            other => Self::Other(other),
        }
    }
}

/// Caller-chosen identifiers attached to a scheduled stream window.
///
/// The framework echoes `start_cookie` / `stop_cookie` as the second
/// parameter of the stream-started / stream-stopped notifications.
/// Every stream in a session shares the same pair, so a stop event
/// says that *a* scheduled stream stopped, not which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionToken {
    pub start_cookie: u16,
    pub stop_cookie: u16,
}

impl CompletionToken {
    pub const RECORDING: CompletionToken = CompletionToken {
        start_cookie: 0xDEAD,
        stop_cookie: 0xBEEF,
    };

    pub fn is_stop(&self, event: &GraphEvent) -> bool {
        event.param2 == self.stop_cookie as isize
    }

    pub fn is_start(&self, event: &GraphEvent) -> bool {
        event.param2 == self.start_cookie as isize
    }
}

impl Default for CompletionToken {
    fn default() -> Self {
        Self::RECORDING
    }
}
