use crate::options::DialogOptions;
use crate::session::{CredentialDialog, DialogHandle, DialogOutcome};
use keygate_provider::{parse_stored, CredentialError, CredentialResult, ModelProbe, ResolvedConfig};
use std::sync::Arc;
use tracing::info;

/// Renders a dialog session and feeds user input back through the handle.
/// `present` must not block; the session runs until the handle reports it
/// closed or the handle is dropped.
pub trait DialogPresenter: Send + Sync {
    fn present(&self, handle: DialogHandle);
}

pub struct ConfigOrchestrator {
    probe: Arc<dyn ModelProbe>,
    dialog: CredentialDialog,
    presenter: Arc<dyn DialogPresenter>,
}

impl ConfigOrchestrator {
    pub fn new(probe: Arc<dyn ModelProbe>, presenter: Arc<dyn DialogPresenter>) -> Self {
        Self {
            dialog: CredentialDialog::new(probe.clone()),
            probe,
            presenter,
        }
    }

    pub fn dialog(&self) -> &CredentialDialog {
        &self.dialog
    }

    /// Reuses the stored credential when there is one and the dialog is not
    /// forced. A failing silent probe is returned as-is; it does not fall back
    /// to the dialog.
    pub async fn acquire(&self, options: &DialogOptions) -> CredentialResult<ResolvedConfig> {
        let stored = options.store.get(&options.storage_key);
        let existing = parse_stored(stored.as_deref());

        if let Some(credential) = existing.as_ref().filter(|_| !options.force_show) {
            info!("Validating stored credential for {}", credential.base_url);
            let models = self
                .probe
                .probe(&credential.base_url, &credential.api_key)
                .await?;
            return Ok(ResolvedConfig::new(credential.clone(), models));
        }

        let (handle, outcome) = self.dialog.open(existing.as_ref(), options);
        self.presenter.present(handle);

        match outcome.wait().await {
            DialogOutcome::Accepted(config) => Ok(config),
            DialogOutcome::Cancelled(source) => {
                info!("Credential dialog cancelled ({:?})", source);
                Err(CredentialError::Cancelled)
            }
        }
    }

    /// Clears the stored credential so the next `acquire` prompts.
    pub fn forget(&self, options: &DialogOptions) -> CredentialResult<()> {
        options
            .store
            .set(&options.storage_key, "")
            .map_err(|e| CredentialError::Store(e.to_string()))
    }
}
