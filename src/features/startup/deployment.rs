use once_cell::sync::OnceCell;
use serenity::model::id::UserId;
use std::sync::atomic::{AtomicBool, Ordering};

/// Deployment facts learned once the application info is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentMode {
    pub owner_id: UserId,
    pub application_id: u64,
    pub self_hosted: bool,
}

/// Write-once holder for [`DeploymentMode`].
///
/// Readers see either nothing (not ready) or the complete mode.
#[derive(Debug, Default)]
pub struct Deployment {
    mode: OnceCell<DeploymentMode>,
    reconciling: AtomicBool,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.mode.get().is_some()
    }

    pub fn mode(&self) -> Option<&DeploymentMode> {
        self.mode.get()
    }

    /// False until the owner is known
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.mode
            .get()
            .map(|mode| mode.owner_id == user_id)
            .unwrap_or(false)
    }

    /// Claim the reconciliation. Only one caller wins until [`Self::abandon`].
    pub(crate) fn begin(&self) -> bool {
        !self.is_ready() && !self.reconciling.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn abandon(&self) {
        self.reconciling.store(false, Ordering::Release);
    }

    /// Returns false if a mode was already published.
    pub(crate) fn publish(&self, mode: DeploymentMode) -> bool {
        self.mode.set(mode).is_ok()
    }
}
