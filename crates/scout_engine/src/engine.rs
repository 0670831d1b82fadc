use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use scout_core::{SearchError, SearchParameters};
use scout_logging::{scout_error, scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::{run_search, Clock, EngineEvent, JobApi, ProgressSink, RetryPolicy, TokioClock};

enum EngineCommand {
    Start { params: SearchParameters },
    Cancel,
}

/// Background thread running searches on a tokio runtime.
///
/// At most one search runs at a time; a `start` while busy is dropped.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(api: Arc<dyn JobApi>, policy: RetryPolicy, sink: Arc<dyn ProgressSink>) -> Self {
        Self::with_clock(api, policy, Arc::new(TokioClock), sink)
    }

    pub fn with_clock(
        api: Arc<dyn JobApi>,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    scout_error!("Failed to start engine runtime: {}", err);
                    fail_pending_commands(cmd_rx, sink.as_ref(), &err.to_string());
                    return;
                }
            };

            let busy = Arc::new(AtomicBool::new(false));
            let mut current: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { params } => {
                        if busy.swap(true, Ordering::AcqRel) {
                            scout_warn!("Search already running; ignoring start request");
                            continue;
                        }
                        let cancel = CancellationToken::new();
                        current = Some(cancel.clone());

                        let api = api.clone();
                        let policy = policy.clone();
                        let clock = clock.clone();
                        let sink = sink.clone();
                        let busy = busy.clone();
                        runtime.spawn(async move {
                            let result = run_search(
                                api.as_ref(),
                                &params,
                                &policy,
                                clock.as_ref(),
                                &cancel,
                                sink.as_ref(),
                            )
                            .await;
                            // Clear before reporting so the next start is accepted.
                            busy.store(false, Ordering::Release);
                            sink.emit(EngineEvent::SearchCompleted(result));
                        });
                    }
                    EngineCommand::Cancel => match current.take() {
                        Some(cancel) => {
                            scout_info!("Cancelling running search");
                            cancel.cancel();
                        }
                        None => scout_warn!("Cancel requested with no search running"),
                    },
                }
            }
        });

        Self { cmd_tx }
    }

    pub fn start(&self, params: SearchParameters) {
        let _ = self.cmd_tx.send(EngineCommand::Start { params });
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel);
    }
}

fn fail_pending_commands(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    sink: &dyn ProgressSink,
    reason: &str,
) {
    while let Ok(command) = cmd_rx.recv() {
        if let EngineCommand::Start { .. } = command {
            sink.emit(EngineEvent::SearchCompleted(Err(SearchError::Submission(
                format!("engine unavailable: {reason}"),
            ))));
        }
    }
}
