use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::event::CompletionToken;

/// Container the multiplexer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Avi,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Avi => "avi",
        }
    }
}

/// How the multiplexer orders samples from several streams on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterleavingMode {
    /// Written in arrival order.
    None,
    /// Interleaved at a granularity a live capture can sustain.
    Capture,
    /// Fully interleaved; highest per-sample overhead.
    Full,
    /// Arrival order, buffered.
    NoneBuffered,
}

/// Configuration for a recording session.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub container: ContainerFormat,

    /// Interleaving applied when both audio and video are recorded.
    pub interleaving: InterleavingMode,

    /// Cookies attached to every scheduled stream window.
    pub completion_token: CompletionToken,

    /// Upper bound on the wait for the stop notification. `None` waits
    /// forever.
    pub completion_timeout: Option<Duration>,

    /// Write `<output>.metadata.json` next to the recording.
    pub write_metadata: bool,

    /// SHA-256 the finished container file.
    pub compute_checksum: bool,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        let token = self.completion_token;
        if token.start_cookie == token.stop_cookie {
            return Err(format!(
                "start and stop cookies must differ (both {:#06x})",
                token.stop_cookie
            ));
        }
        if self.completion_timeout == Some(Duration::ZERO) {
            return Err("completion timeout must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            container: ContainerFormat::Avi,
            interleaving: InterleavingMode::Capture,
            completion_token: CompletionToken::RECORDING,
            completion_timeout: None,
            write_metadata: false,
            compute_checksum: true,
        }
    }
}
