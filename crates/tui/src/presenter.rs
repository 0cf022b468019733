use crate::app::App;
use keygate_dialog::{DialogHandle, DialogPresenter};
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use ratatui::DefaultTerminal;
use std::io;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

type DialogRunner = fn(DialogHandle) -> io::Result<()>;

/// Draws dialog sessions full-screen on a dedicated UI thread.
pub struct TerminalPresenter {
    ui_thread: Mutex<Option<JoinHandle<io::Result<()>>>>,
    run: DialogRunner,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::with_runner(run_dialog)
    }

    fn with_runner(run: DialogRunner) -> Self {
        Self {
            ui_thread: Mutex::new(None),
            run,
        }
    }

    /// Waits for the UI thread to restore the terminal.
    pub fn finish(&self) -> io::Result<()> {
        let thread = self
            .ui_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match thread {
            Some(thread) => thread
                .join()
                .map_err(|_| io::Error::other("UI thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl DialogPresenter for TerminalPresenter {
    fn present(&self, handle: DialogHandle) {
        let mut slot = self
            .ui_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = slot.take();
        let run = self.run;
        *slot = Some(std::thread::spawn(move || {
            // A superseded session restores the terminal before the next one takes it.
            if let Some(previous) = previous {
                match previous.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!("Previous dialog UI failed: {}", e),
                    Err(_) => tracing::warn!("Previous dialog UI thread panicked"),
                }
            }
            run(handle)
        }));
    }
}

fn run_dialog(handle: DialogHandle) -> io::Result<()> {
    tracing::debug!("Presenting dialog {}", handle.id());
    let mut terminal = ratatui::init();
    let _ = ratatui::crossterm::execute!(io::stdout(), EnableMouseCapture);

    let result = event_loop(&mut terminal, App::new(handle));

    let _ = ratatui::crossterm::execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, mut app: App) -> io::Result<()> {
    loop {
        app.sync_view();
        if app.is_closed() {
            return Ok(());
        }

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            app.handle_event(event::read()?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use keygate_dialog::{
        CancelSource, CredentialDialog, DialogOptions, DialogOutcome, SessionOutcome,
    };
    use keygate_provider::{CredentialResult, MemoryStore, ModelProbe};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::time::timeout;

    static TRACE: Mutex<Vec<(u64, &'static str)>> = Mutex::new(Vec::new());

    struct NoProbe;

    #[async_trait]
    impl ModelProbe for NoProbe {
        async fn probe(&self, _base_url: &str, _api_key: &str) -> CredentialResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// Stands in for the terminal loop: runs until the session closes.
    fn headless(handle: DialogHandle) -> io::Result<()> {
        TRACE.lock().unwrap().push((handle.id(), "start"));
        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.view().is_closed() {
            if Instant::now() > deadline {
                return Err(io::Error::other("dialog never closed"));
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        TRACE.lock().unwrap().push((handle.id(), "end"));
        Ok(())
    }

    async fn outcome_of(outcome: SessionOutcome) -> DialogOutcome {
        timeout(Duration::from_secs(2), outcome.wait())
            .await
            .expect("outcome in time")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn superseding_present_does_not_block_the_runtime() {
        let presenter = TerminalPresenter::with_runner(headless);
        let dialog = CredentialDialog::new(Arc::new(NoProbe));
        let options = DialogOptions::new(Arc::new(MemoryStore::new()));

        let (first, first_outcome) = dialog.open(None, &options);
        let first_id = first.id();
        presenter.present(first);

        let (second, second_outcome) = dialog.open(None, &options);
        let second_id = second.id();
        presenter.present(second);

        let (third, _third_outcome) = dialog.open(None, &options);
        assert_eq!(
            outcome_of(first_outcome).await,
            DialogOutcome::Cancelled(CancelSource::Superseded)
        );
        assert_eq!(
            outcome_of(second_outcome).await,
            DialogOutcome::Cancelled(CancelSource::Superseded)
        );

        presenter.finish().unwrap();
        drop(third);

        let trace: Vec<_> = TRACE
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|(id, _)| *id == first_id || *id == second_id)
            .collect();
        assert_eq!(
            trace,
            vec![
                (first_id, "start"),
                (first_id, "end"),
                (second_id, "start"),
                (second_id, "end"),
            ]
        );
    }
}
