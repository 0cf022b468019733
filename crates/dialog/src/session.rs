use crate::machine::{CancelSource, DialogMachine, DialogPhase, SubmitRejection};
use crate::options::{BaseUrlChoice, DialogOptions};
use keygate_provider::{ConfigStore, Credential, CredentialError, CredentialResult, ModelProbe, ResolvedConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// User input forwarded by a presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Submit { base_url: String, api_key: String },
    DismissError,
    Close(CancelSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Accepted(ResolvedConfig),
    Cancelled(CancelSource),
}

/// What a presenter needs to draw the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub phase: DialogPhase,
    pub error: Option<String>,
    pub seed: Credential,
    pub title: String,
    pub base_url_label: String,
    pub api_key_label: String,
    pub button_label: String,
    pub help: String,
    pub suggestions: Vec<String>,
    pub choices: Option<Vec<BaseUrlChoice>>,
}

impl DialogView {
    fn new(seed: Credential, options: &DialogOptions) -> Self {
        Self {
            phase: DialogPhase::Open,
            error: None,
            seed,
            title: options.title.clone(),
            base_url_label: options.base_url_label.clone(),
            api_key_label: options.api_key_label.clone(),
            button_label: options.button_label.clone(),
            help: options.help.clone(),
            suggestions: options.default_base_urls.clone(),
            choices: options.base_urls.clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, DialogPhase::Closed(_))
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == DialogPhase::Submitting
    }
}

/// Starting values: the stored pair, else the first choice, else the first
/// suggestion.
pub fn seed_credential(existing: Option<&Credential>, options: &DialogOptions) -> Credential {
    let base_url = existing
        .map(|c| c.base_url.as_str())
        .filter(|url| !url.is_empty())
        .or_else(|| {
            options
                .base_urls
                .as_ref()
                .and_then(|choices| choices.first())
                .map(|choice| choice.url.as_str())
                .filter(|url| !url.is_empty())
        })
        .or_else(|| options.default_base_urls.first().map(String::as_str))
        .unwrap_or_default();
    let api_key = existing.map(|c| c.api_key.as_str()).unwrap_or_default();
    Credential::new(base_url, api_key)
}

/// Presenter side of a live session. Dropping it cancels the session.
pub struct DialogHandle {
    id: u64,
    events: mpsc::UnboundedSender<DialogEvent>,
    view: watch::Receiver<DialogView>,
}

impl DialogHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns false once the session has closed.
    pub fn send(&self, event: DialogEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn submit(&self, base_url: impl Into<String>, api_key: impl Into<String>) -> bool {
        self.send(DialogEvent::Submit {
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn close(&self, source: CancelSource) -> bool {
        self.send(DialogEvent::Close(source))
    }

    pub fn view(&self) -> DialogView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DialogView> {
        self.view.clone()
    }
}

pub struct SessionOutcome {
    rx: oneshot::Receiver<DialogOutcome>,
}

impl SessionOutcome {
    pub async fn wait(self) -> DialogOutcome {
        self.rx
            .await
            .unwrap_or(DialogOutcome::Cancelled(CancelSource::Detached))
    }
}

struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

type Registry = Arc<Mutex<Option<ActiveSession>>>;

/// Opens credential dialogs, keeping at most one alive.
#[derive(Clone)]
pub struct CredentialDialog {
    probe: Arc<dyn ModelProbe>,
    active: Registry,
    next_id: Arc<AtomicU64>,
}

impl CredentialDialog {
    pub fn new(probe: Arc<dyn ModelProbe>) -> Self {
        Self {
            probe,
            active: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn active_session(&self) -> Option<u64> {
        lock_registry(&self.active).as_ref().map(|s| s.id)
    }

    /// Starts a new session, tearing down the live one first. Must be called
    /// from within a tokio runtime.
    pub fn open(
        &self,
        existing: Option<&Credential>,
        options: &DialogOptions,
    ) -> (DialogHandle, SessionOutcome) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let previous = lock_registry(&self.active).replace(ActiveSession {
            id,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            info!("Dialog {} superseded by dialog {}", previous.id, id);
            previous.cancel.cancel();
        }

        let view = DialogView::new(seed_credential(existing, options), options);
        let (view_tx, view_rx) = watch::channel(view);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let driver = SessionDriver {
            id,
            machine: DialogMachine::new(),
            probe: self.probe.clone(),
            store: options.store.clone(),
            storage_key: options.storage_key.clone(),
            events: event_rx,
            view: view_tx,
            cancel,
            outcome: Some(outcome_tx),
            registry: self.active.clone(),
        };
        tokio::spawn(driver.run());

        debug!("Dialog {} opened", id);
        (
            DialogHandle {
                id,
                events: event_tx,
                view: view_rx,
            },
            SessionOutcome { rx: outcome_rx },
        )
    }
}

fn lock_registry(registry: &Registry) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

type PendingProbe = (Credential, JoinHandle<CredentialResult<Vec<String>>>);

struct SessionDriver {
    id: u64,
    machine: DialogMachine,
    probe: Arc<dyn ModelProbe>,
    store: Arc<dyn ConfigStore>,
    storage_key: String,
    events: mpsc::UnboundedReceiver<DialogEvent>,
    view: watch::Sender<DialogView>,
    cancel: CancellationToken,
    outcome: Option<oneshot::Sender<DialogOutcome>>,
    registry: Registry,
}

impl SessionDriver {
    async fn run(mut self) {
        let mut pending: Option<PendingProbe> = None;

        while !self.machine.is_closed() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.cancel_with(CancelSource::Superseded);
                }
                event = self.events.recv() => match event {
                    None => self.cancel_with(CancelSource::Detached),
                    Some(DialogEvent::Close(source)) => self.cancel_with(source),
                    Some(DialogEvent::DismissError) => {
                        self.machine.dismiss_error();
                        self.publish();
                    }
                    Some(DialogEvent::Submit { base_url, api_key }) => {
                        if let Some(started) = self.submit(&base_url, &api_key) {
                            pending = Some(started);
                        }
                    }
                },
                result = wait_probe(&mut pending), if pending.is_some() => {
                    if let Some((credential, _)) = pending.take() {
                        self.finish_probe(credential, result);
                    }
                }
            }
        }

        if pending.is_some() {
            // The request keeps running; its result has nowhere to go.
            debug!("Dialog {} closed with a probe in flight, discarding its result", self.id);
        }
    }

    fn submit(&mut self, base_url: &str, api_key: &str) -> Option<PendingProbe> {
        match self.machine.submit(base_url, api_key) {
            Ok(credential) => {
                let probe = self.probe.clone();
                let candidate = credential.clone();
                let task = tokio::spawn(async move {
                    probe.probe(&candidate.base_url, &candidate.api_key).await
                });
                self.publish();
                Some((credential, task))
            }
            Err(SubmitRejection::InvalidUrl) => {
                self.publish();
                None
            }
            Err(rejection) => {
                debug!("Dialog {} ignored submit: {:?}", self.id, rejection);
                None
            }
        }
    }

    fn finish_probe(
        &mut self,
        credential: Credential,
        result: Result<CredentialResult<Vec<String>>, JoinError>,
    ) {
        let models = match result {
            Ok(Ok(models)) => models,
            Ok(Err(e)) => {
                debug!("Dialog {} probe failed: {}", self.id, e);
                self.machine.submission_failed(e.to_string());
                self.publish();
                return;
            }
            Err(e) => {
                warn!("Dialog {} probe task failed: {}", self.id, e);
                self.machine.submission_failed(format!("Probe failed: {}", e));
                self.publish();
                return;
            }
        };

        if let Err(e) = self.store.set(&self.storage_key, &credential.to_stored()) {
            let error = CredentialError::Store(e.to_string());
            warn!("Dialog {}: {}", self.id, error);
            self.machine.submission_failed(error.to_string());
            self.publish();
            return;
        }

        self.machine.accept();
        self.publish();
        info!("Dialog {} accepted credential for {}", self.id, credential.base_url);
        self.settle(DialogOutcome::Accepted(ResolvedConfig::new(credential, models)));
    }

    fn cancel_with(&mut self, source: CancelSource) {
        if self.machine.cancel(source) {
            debug!("Dialog {} cancelled: {:?}", self.id, source);
            self.publish();
            self.settle(DialogOutcome::Cancelled(source));
        }
    }

    /// The registry slot is released before the outcome becomes observable.
    fn settle(&mut self, outcome: DialogOutcome) {
        {
            let mut active = lock_registry(&self.registry);
            if active.as_ref().is_some_and(|s| s.id == self.id) {
                *active = None;
            }
        }
        if let Some(tx) = self.outcome.take() {
            let _ = tx.send(outcome);
        }
    }

    fn publish(&self) {
        let phase = self.machine.phase();
        let error = self.machine.error().map(str::to_string);
        self.view.send_modify(|view| {
            view.phase = phase;
            view.error = error;
        });
    }
}

async fn wait_probe(
    pending: &mut Option<PendingProbe>,
) -> Result<CredentialResult<Vec<String>>, JoinError> {
    match pending {
        Some((_, task)) => task.await,
        None => std::future::pending().await,
    }
}
