use super::device::DeviceCategory;
use super::event::CompletionToken;
use super::timing::StreamWindow;

/// A capture node that was added, connected to the multiplexer, and
/// scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamBinding {
    pub category: DeviceCategory,
    /// Multiplexer input index, assigned in binding order.
    pub stream_index: u32,
    pub window: StreamWindow,
    pub token: CompletionToken,
}

/// Result of trying to bind one device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound(StreamBinding),
    /// No usable device in this category; that medium is simply not recorded.
    Unavailable,
}

impl BindOutcome {
    pub fn binding(&self) -> Option<&StreamBinding> {
        match self {
            Self::Bound(binding) => Some(binding),
            Self::Unavailable => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}
