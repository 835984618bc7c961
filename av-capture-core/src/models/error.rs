use std::fmt;

use thiserror::Error;

use super::device::DeviceCategory;

/// A failed call into the capture framework, carrying the framework's own
/// status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} returned {code:#010x}: {message}")]
pub struct FrameworkFault {
    pub operation: &'static str,
    pub code: i32,
    pub message: String,
}

impl FrameworkFault {
    pub fn new(operation: &'static str, code: i32, message: impl Into<String>) -> Self {
        Self {
            operation,
            code,
            message: message.into(),
        }
    }
}

/// Step of pipeline setup or control at which a framework call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultStage {
    Initialize,
    CreateGraph,
    CreateMultiplexer,
    AddNode,
    Connect,
    Schedule,
    SyncCapability,
    SetMasterStream,
    SetInterleaving,
    Run,
}

impl fmt::Display for FaultStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "framework initialization",
            Self::CreateGraph => "graph creation",
            Self::CreateMultiplexer => "multiplexer creation",
            Self::AddNode => "adding capture node",
            Self::Connect => "connecting capture pin",
            Self::Schedule => "scheduling stream window",
            Self::SyncCapability => "querying multiplexer sync control",
            Self::SetMasterStream => "setting master stream",
            Self::SetInterleaving => "setting interleaving mode",
            Self::Run => "running pipeline",
        };
        f.write_str(name)
    }
}

/// Fatal errors that abort a recording attempt.
///
/// A missing device is deliberately absent from this enum: it is reported
/// through `BindOutcome::Unavailable` and never propagates as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no camera and microphone available")]
    NoSources,

    #[error("{stage} failed{}: {source}", for_category(.category))]
    Fault {
        stage: FaultStage,
        category: Option<DeviceCategory>,
        source: FrameworkFault,
    },

    #[error("graph invariant violated: {0}")]
    GraphInvariant(String),

    #[error("no stop notification after {waited_ms}ms")]
    CompletionTimeout { waited_ms: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl CaptureError {
    pub fn fault(stage: FaultStage, category: Option<DeviceCategory>, source: FrameworkFault) -> Self {
        Self::Fault {
            stage,
            category,
            source,
        }
    }

    /// Stage of the failed framework call, if this is an environment fault.
    pub fn stage(&self) -> Option<FaultStage> {
        match self {
            Self::Fault { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn for_category(category: &Option<DeviceCategory>) -> String {
    category
        .map(|c| format!(" for {}", c.device_label()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_message_names_stage_device_and_code() {
        let err = CaptureError::fault(
            FaultStage::Connect,
            Some(DeviceCategory::Video),
            FrameworkFault::new("RenderStream", 0x8004_0217_u32 as i32, "no combination of filters"),
        );
        assert_eq!(
            err.to_string(),
            "connecting capture pin failed for camera: RenderStream returned 0x80040217: no combination of filters"
        );
        assert_eq!(err.stage(), Some(FaultStage::Connect));
    }

    #[test]
    fn pipeline_fault_has_no_device_suffix() {
        let err = CaptureError::fault(FaultStage::Run, None, FrameworkFault::new("Run", 1, "boom"));
        assert!(err.to_string().starts_with("running pipeline failed: "));
    }
}
