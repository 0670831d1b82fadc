use std::sync::mpsc;
use std::thread;

use scout_core::{Effect, Msg};
use scout_engine::{EngineEvent, EngineHandle};
use scout_logging::{scout_info, scout_warn};

use super::host::{Clipboard, Host};

/// Forwards engine events into the UI message queue until either side hangs up.
pub fn spawn_event_loop(
    event_rx: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                return;
            }
        }
    })
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::JobStarted(job) => Msg::JobStarted(job),
        EngineEvent::StatusChecked { attempt, status } => Msg::StatusObserved { attempt, status },
        EngineEvent::SearchCompleted(Ok(items)) => Msg::ResultsFetched(items),
        EngineEvent::SearchCompleted(Err(err)) => {
            scout_warn!("Search failed: {}", err);
            Msg::SearchFailed(err)
        }
    }
}

/// Executes effects: searches go to the engine, exports to the host.
pub struct EffectRunner<C: Clipboard> {
    engine: EngineHandle,
    host: Host<C>,
    msg_tx: mpsc::Sender<Msg>,
}

impl<C: Clipboard> EffectRunner<C> {
    pub fn new(engine: EngineHandle, host: Host<C>, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            engine,
            host,
            msg_tx,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSearch { params } => {
                    scout_info!(
                        "StartSearch query_len={} max_results={} recent_only={}",
                        params.query.len(),
                        params.max_results,
                        params.recent_only
                    );
                    self.engine.start(params);
                }
                Effect::CancelSearch => self.engine.cancel(),
                Effect::SaveCsv { filename, contents } => {
                    let outcome = self.host.save_file(&filename, &contents);
                    let _ = self.msg_tx.send(Msg::ExportFinished(outcome));
                }
                Effect::CopyText { text } => {
                    let outcome = self.host.copy_text(text);
                    let _ = self.msg_tx.send(Msg::ExportFinished(outcome));
                }
            }
        }
    }

    /// Blocks until copied text no longer needs this process to stay alive.
    pub fn hand_over_clipboard(&mut self) {
        self.host.hand_over_clipboard();
    }

    #[cfg(test)]
    pub(crate) fn host(&self) -> &Host<C> {
        &self.host
    }
}
