//! DirectShow capture device enumeration via the system device enumerator.
//!
//! Wraps `ICreateDevEnum` to list video and audio input devices as
//! monikers, with their friendly names for logging.

use windows::core::*;
use windows::Win32::Foundation::S_OK;
use windows::Win32::Media::DirectShow::*;
use windows::Win32::System::Com::StructuredStorage::IPropertyBag;
use windows::Win32::System::Com::*;
use windows::Win32::System::Variant::*;

use av_capture_core::models::device::DeviceCategory;
use av_capture_core::models::error::FrameworkFault;

use crate::guids;

/// An enumerated capture device, not yet instantiated as a filter.
pub struct DirectShowDevice {
    pub moniker: IMoniker,
    pub name: String,
}

/// Capture device enumerator using the DirectShow system device enumerator.
pub struct DeviceEnumerator {
    enumerator: ICreateDevEnum,
}

impl DeviceEnumerator {
    /// Create a new device enumerator.
    ///
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> std::result::Result<Self, FrameworkFault> {
        unsafe {
            let enumerator: ICreateDevEnum =
                CoCreateInstance(&guids::CLSID_SYSTEM_DEVICE_ENUM, None, CLSCTX_INPROC_SERVER)
                    .map_err(|e| FrameworkFault::new("CoCreateInstance(SystemDeviceEnum)", e.code().0, e.message()))?;
            Ok(Self { enumerator })
        }
    }

    /// List devices of `category` in the order the catalog reports them.
    ///
    /// An empty category is reported by the class enumerator as `S_FALSE`
    /// with no enumerator; that comes back as an empty list.
    pub fn list(&self, category: DeviceCategory) -> std::result::Result<Vec<DirectShowDevice>, FrameworkFault> {
        unsafe {
            let mut enum_moniker: Option<IEnumMoniker> = None;
            self.enumerator
                .CreateClassEnumerator(guids::device_class(category), &mut enum_moniker, 0)
                .map_err(|e| FrameworkFault::new("CreateClassEnumerator", e.code().0, e.message()))?;

            let Some(enum_moniker) = enum_moniker else {
                return Ok(Vec::new());
            };

            let mut devices = Vec::new();
            loop {
                let mut fetched = [None];
                if enum_moniker.Next(&mut fetched, None) != S_OK {
                    break;
                }
                let Some(moniker) = fetched[0].take() else {
                    break;
                };

                let name = Self::friendly_name(&moniker)
                    .unwrap_or_else(|| format!("{} device {}", category, devices.len()));
                devices.push(DirectShowDevice { moniker, name });
            }

            Ok(devices)
        }
    }

    /// Read the `FriendlyName` entry from a device moniker's property bag.
    fn friendly_name(moniker: &IMoniker) -> Option<String> {
        unsafe {
            let bag: IPropertyBag = moniker.BindToStorage(None, None).ok()?;

            let mut value = VARIANT::default();
            bag.Read(w!("FriendlyName"), &mut value, None).ok()?;

            let name = if value.Anonymous.Anonymous.vt == VT_BSTR {
                Some(value.Anonymous.Anonymous.Anonymous.bstrVal.to_string())
            } else {
                None
            };

            VariantClear(&mut value).ok();
            name
        }
    }
}
