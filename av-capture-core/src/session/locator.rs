use crate::models::device::DeviceCategory;
use crate::traits::capture_framework::CaptureFramework;

/// Find the first device in `category` that the framework can turn into a
/// capture node.
///
/// Enumeration errors and empty catalogs both come back as `None`; there
/// is no retry. Devices are tried in catalog order and one that fails to
/// bind is skipped in favor of the next.
pub fn locate<F: CaptureFramework>(framework: &mut F, category: DeviceCategory) -> Option<F::Node> {
    let devices = match framework.enumerate(category) {
        Ok(devices) => devices,
        Err(e) => {
            log::debug!("{category} device enumeration failed: {e}");
            return None;
        }
    };

    let total = devices.len();
    if total == 0 {
        log::debug!("no {category} devices enumerated");
        return None;
    }

    for (position, device) in devices.into_iter().enumerate() {
        match framework.bind_device(device) {
            Ok(node) => {
                log::debug!("using {category} device {} of {total}", position + 1);
                return Some(node);
            }
            Err(e) => log::debug!("skipping {category} device {}: {e}", position + 1),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, Failure, ScriptedFramework};

    #[test]
    fn returns_first_device_in_catalog_order() {
        let mut framework = ScriptedFramework::new()
            .with_camera("front")
            .with_camera("rear");

        let node = locate(&mut framework, DeviceCategory::Video).unwrap();
        assert_eq!(node.name, "front");
    }

    #[test]
    fn skips_devices_that_cannot_be_bound() {
        let mut framework = ScriptedFramework::new()
            .with_unbindable(DeviceCategory::Audio, "broken")
            .with_microphone("usb-mic");
        let handle = framework.handle();

        let node = locate(&mut framework, DeviceCategory::Audio).unwrap();
        assert_eq!(node.name, "usb-mic");
        assert_eq!(handle.count(|c| matches!(c, Call::BindDevice(_))), 2);
    }

    #[test]
    fn empty_catalog_and_enumeration_error_look_the_same() {
        let mut empty = ScriptedFramework::new();
        assert!(locate(&mut empty, DeviceCategory::Video).is_none());

        let mut failing = ScriptedFramework::new()
            .with_camera("cam")
            .fail(Failure::Enumerate(DeviceCategory::Video));
        assert!(locate(&mut failing, DeviceCategory::Video).is_none());
    }

    #[test]
    fn nothing_bindable_is_not_found() {
        let mut framework = ScriptedFramework::new().with_unbindable(DeviceCategory::Video, "ghost");
        assert!(locate(&mut framework, DeviceCategory::Video).is_none());
    }
}
