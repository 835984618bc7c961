pub mod binding;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod recording_result;
pub mod state;
pub mod timing;
