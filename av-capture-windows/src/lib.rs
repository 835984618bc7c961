//! # av-capture-windows
//!
//! Windows DirectShow backend for av-capture.
//!
//! Provides:
//! - `DirectShowFramework`: `CaptureFramework` over `ICaptureGraphBuilder2`
//!   with an AVI multiplexer and file writer
//! - `DeviceEnumerator`: video and audio input devices via the system
//!   device enumerator
//! - `ComApartment`: paired COM initialize/uninitialize
//!
//! ## Usage
//! ```ignore
//! use av_capture_core::RecordingSession;
//! use av_capture_windows::DirectShowFramework;
//!
//! let mut session = RecordingSession::new(DirectShowFramework::new(), "record.avi")?;
//! let result = session.record(10)?;
//! ```

#[cfg(target_os = "windows")]
pub mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod directshow;
#[cfg(target_os = "windows")]
pub mod guids;

#[cfg(target_os = "windows")]
pub use device_enumerator::{DeviceEnumerator, DirectShowDevice};
#[cfg(target_os = "windows")]
pub use directshow::DirectShowFramework;
