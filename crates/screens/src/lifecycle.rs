//! Mounted/unmounted tracking for screens

use guard_portal_resources::CancelFlag;

/// Tracks whether a screen is still displayed
///
/// Unmounting raises the cancel flag shared with in-flight reads, so pending
/// retries stop and late results are dropped.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    cancel: CancelFlag,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn unmount_handle(&self) -> UnmountHandle {
        UnmountHandle(self.cancel.clone())
    }
}

/// Handle the UI keeps to signal that a screen went away
#[derive(Debug, Clone)]
pub struct UnmountHandle(CancelFlag);

impl UnmountHandle {
    pub fn unmount(&self) {
        self.0.cancel();
    }
}
