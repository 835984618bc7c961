//! COM apartment bracket for the DirectShow backend.

use windows::Win32::System::Com::*;

use av_capture_core::models::error::FrameworkFault;

/// Single-threaded COM apartment entered for the lifetime of a session.
///
/// `enter` and `leave` pair up exactly once; dropping an apartment that
/// was entered but never left leaves it.
pub struct ComApartment {
    entered: bool,
}

impl ComApartment {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter(&mut self) -> Result<(), FrameworkFault> {
        if self.entered {
            return Ok(());
        }
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| FrameworkFault::new("CoInitializeEx", e.code().0, e.message()))?;
        }
        self.entered = true;
        Ok(())
    }

    /// Unload DLLs whose objects are gone, then leave the apartment.
    pub fn leave(&mut self) {
        if !self.entered {
            return;
        }
        self.entered = false;
        unsafe {
            CoFreeUnusedLibraries();
            CoUninitialize();
        }
    }
}

impl Default for ComApartment {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        self.leave();
    }
}
