use crate::models::error::{CaptureError, FaultStage};
use crate::traits::capture_framework::CaptureFramework;

/// RAII bracket around the framework's per-session runtime.
///
/// `enter` initializes the framework; dropping the scope (or calling
/// `exit`) releases any remaining graph and then the runtime, once.
pub struct FrameworkScope<F: CaptureFramework> {
    framework: F,
    active: bool,
}

impl<F: CaptureFramework> FrameworkScope<F> {
    pub fn enter(mut framework: F) -> Result<Self, CaptureError> {
        framework
            .initialize()
            .map_err(|e| CaptureError::fault(FaultStage::Initialize, None, e))?;
        log::debug!("capture framework initialized");
        Ok(Self {
            framework,
            active: true,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn framework(&self) -> &F {
        &self.framework
    }

    /// Mutable access for building graphs inside the scope. Crate-only so
    /// the runtime can be released through `exit` alone.
    pub(crate) fn framework_mut(&mut self) -> &mut F {
        &mut self.framework
    }

    /// Release the graph and the runtime now. Later calls, including the
    /// one from `Drop`, do nothing.
    pub fn exit(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.framework.release_graph();
        self.framework.uninitialize();
        log::debug!("capture framework released");
    }
}

impl<F: CaptureFramework> Drop for FrameworkScope<F> {
    fn drop(&mut self) {
        self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Failure, ScriptedFramework};

    #[test]
    fn drop_releases_runtime_once() {
        let framework = ScriptedFramework::new();
        let handle = framework.handle();

        let scope = FrameworkScope::enter(framework).unwrap();
        assert!(scope.is_active());
        assert_eq!(handle.runtime_depth(), 1);

        drop(scope);
        assert_eq!(handle.runtime_depth(), 0);
        assert_eq!(handle.uninitialize_count(), 1);
    }

    #[test]
    fn explicit_exit_then_drop_does_not_double_release() {
        let framework = ScriptedFramework::new();
        let handle = framework.handle();

        let mut scope = FrameworkScope::enter(framework).unwrap();
        scope.exit();
        scope.exit();
        drop(scope);

        assert_eq!(handle.initialize_count(), 1);
        assert_eq!(handle.uninitialize_count(), 1);
    }

    #[test]
    fn graph_work_inside_scope_leaves_runtime_to_the_guard() {
        let framework = ScriptedFramework::new().with_camera("cam");
        let handle = framework.handle();

        let mut scope = FrameworkScope::enter(framework).unwrap();
        scope.framework_mut().create_graph().unwrap();
        assert!(handle.is_graph_live());
        assert_eq!(handle.uninitialize_count(), 0);

        drop(scope);

        assert!(!handle.is_graph_live());
        assert_eq!(handle.uninitialize_count(), 1);
        assert_eq!(handle.runtime_depth(), 0);
    }

    #[test]
    fn failed_initialize_is_not_paired_with_uninitialize() {
        let framework = ScriptedFramework::new().fail(Failure::Initialize);
        let handle = framework.handle();

        let err = FrameworkScope::enter(framework).err().unwrap();
        assert_eq!(err.stage(), Some(FaultStage::Initialize));
        assert_eq!(handle.uninitialize_count(), 0);
    }

    #[test]
    fn sessions_compose_in_one_process() {
        let first = ScriptedFramework::new();
        let first_handle = first.handle();
        let second = ScriptedFramework::new();
        let second_handle = second.handle();

        let a = FrameworkScope::enter(first).unwrap();
        let b = FrameworkScope::enter(second).unwrap();
        drop(a);
        assert_eq!(second_handle.runtime_depth(), 1);
        drop(b);

        assert_eq!(first_handle.runtime_depth(), 0);
        assert_eq!(second_handle.runtime_depth(), 0);
    }
}
