//! Credential gate consulted before a video job is submitted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

/// External, possibly interactive, API key chooser.
#[async_trait]
pub trait CredentialChooser: Send + Sync {
    /// Whether a credential is currently selected.
    async fn has_credential(&self) -> bool;
    /// Let the user pick a credential. Resolves when they finish or dismiss it.
    async fn open_chooser(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Ready,
    NeedsSelection,
}

/// Checks that a credential is selected, prompting through the chooser when
/// it is not.
///
/// Without a chooser the gate always reports `Ready` and leaves the
/// downstream call to fail on its own. Nothing is cached between calls.
#[derive(Clone, Default)]
pub struct CredentialGate {
    chooser: Option<Arc<dyn CredentialChooser>>,
}

impl CredentialGate {
    pub fn new(chooser: Arc<dyn CredentialChooser>) -> Self {
        Self {
            chooser: Some(chooser),
        }
    }

    /// A gate with no chooser available.
    pub fn unattended() -> Self {
        Self { chooser: None }
    }

    pub fn has_chooser(&self) -> bool {
        self.chooser.is_some()
    }

    /// Query the current state without prompting.
    pub async fn check(&self) -> GateStatus {
        match &self.chooser {
            None => GateStatus::Ready,
            Some(chooser) if chooser.has_credential().await => GateStatus::Ready,
            Some(_) => GateStatus::NeedsSelection,
        }
    }

    /// Open the chooser and re-query once it resolves.
    pub async fn prompt_selection(&self) -> GateStatus {
        let Some(chooser) = &self.chooser else {
            return GateStatus::Ready;
        };
        chooser.open_chooser().await;
        if chooser.has_credential().await {
            GateStatus::Ready
        } else {
            warn!(
                target: "listing_ai::credentials",
                "credential chooser closed without a selection"
            );
            GateStatus::NeedsSelection
        }
    }

    /// `check`, then `prompt_selection` if nothing is selected.
    pub async fn ensure_credential(&self) -> GateStatus {
        match self.check().await {
            GateStatus::Ready => GateStatus::Ready,
            GateStatus::NeedsSelection => self.prompt_selection().await,
        }
    }

    /// Open the chooser unconditionally. No-op without a chooser.
    pub async fn reselect(&self) {
        match &self.chooser {
            Some(chooser) => chooser.open_chooser().await,
            None => debug!(
                target: "listing_ai::credentials",
                "no credential chooser available; skipping re-selection"
            ),
        }
    }
}

impl std::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGate")
            .field("has_chooser", &self.chooser.is_some())
            .finish()
    }
}
