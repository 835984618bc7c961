use crate::models::device::SourceDescriptor;
use crate::models::error::FrameworkFault;
use crate::models::event::CompletionToken;
use crate::models::timing::StreamWindow;
use crate::traits::capture_framework::CaptureFramework;

/// Register a stream window of `[0, duration_secs)` for `node`, tagged
/// with `token`. The framework applies it only once the graph runs.
pub fn schedule<F: CaptureFramework>(
    framework: &mut F,
    node: &F::Node,
    source: &SourceDescriptor,
    duration_secs: u32,
    token: CompletionToken,
) -> Result<StreamWindow, FrameworkFault> {
    let window = StreamWindow::for_duration(duration_secs);
    framework.schedule_stream_window(node, source, window, token)?;
    log::debug!(
        "{} stream scheduled: start {} stop {} (cookies {:#06x}/{:#06x})",
        source.category,
        window.start.ticks(),
        window.stop.ticks(),
        token.start_cookie,
        token.stop_cookie
    );
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::device::{DeviceCategory, AUDIO_SOURCE};
    use crate::models::timing::ReferenceTime;
    use crate::testing::{Call, ScriptedFramework};

    #[test]
    fn stop_time_is_duration_in_ticks() {
        let mut framework = ScriptedFramework::new();
        let handle = framework.handle();
        let node = framework.node("mic", DeviceCategory::Audio);

        let window = schedule(&mut framework, &node, &AUDIO_SOURCE, 3, CompletionToken::RECORDING).unwrap();

        assert_eq!(window.start, ReferenceTime::ZERO);
        assert_eq!(window.stop.ticks(), 30_000_000);
        assert_eq!(
            handle.calls().last(),
            Some(&Call::Schedule {
                node: "mic".into(),
                window,
                token: CompletionToken::RECORDING,
            })
        );
    }
}
