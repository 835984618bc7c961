pub mod capture_framework;
pub mod recording_delegate;
