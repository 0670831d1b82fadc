use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use scout_core::{update, AppState, ExportOutcome, Msg, Severity};
use scout_engine::{ApifyClient, ChannelProgressSink, EngineHandle};
use scout_logging::{scout_debug, scout_error, scout_info, scout_warn};

use super::cli::CliArgs;
use super::config::{AppConfig, FileConfig};
use super::effects::{spawn_event_loop, EffectRunner};
use super::host::{Clipboard, Host, SystemClipboard};
use super::{logging, render};

const TICK: Duration = Duration::from_millis(250);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    logging::initialize(args.verbose, args.log_file.as_deref());

    let file = FileConfig::load(args.config.as_deref())?;
    let config = AppConfig::resolve(&args, file)?;
    scout_debug!("Resolved configuration: {:?}", config);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (event_tx, event_rx) = mpsc::channel();
    let api = ApifyClient::new(config.api.clone()).context("invalid API settings")?;
    let engine = EngineHandle::new(
        Arc::new(api),
        config.policy.clone(),
        Arc::new(ChannelProgressSink::new(event_tx)),
    );
    spawn_event_loop(event_rx, msg_tx.clone());
    let host = Host::new(config.output_dir.clone(), SystemClipboard::default());
    let runner = EffectRunner::new(engine, host, msg_tx.clone());
    let search_over = Arc::new(AtomicBool::new(false));
    spawn_interrupt_listener(msg_tx, search_over.clone());

    let mut session = Session::new(AppState::with_csv_dialect(config.csv_dialect), runner);
    for msg in args.form_messages() {
        session.dispatch(msg);
    }
    session.dispatch(Msg::SearchClicked);

    while session.state.is_loading() {
        match msg_rx.recv_timeout(TICK) {
            Ok(msg) => session.dispatch(msg),
            Err(mpsc::RecvTimeoutError::Timeout) => session.dispatch(Msg::Tick),
            Err(mpsc::RecvTimeoutError::Disconnected) => bail!("search engine stopped"),
        }
    }
    search_over.store(true, Ordering::SeqCst);
    // A finished search clears the notice; anything left means it failed or
    // was cancelled.
    let search_ended_early = session.state.notice().is_some();
    session.report_notice();
    if search_ended_early {
        return Ok(ExitCode::FAILURE);
    }

    for line in render::render_results(&session.state.view()) {
        println!("{line}");
    }

    if args.csv {
        session.dispatch(Msg::ExportCsvClicked);
        session.wait_for_export(&msg_rx)?;
    }
    if args.copy {
        session.dispatch(Msg::CopyClipboardClicked);
        if session.wait_for_export(&msg_rx)? {
            if cfg!(target_os = "linux") {
                eprintln!(
                    "Keeping the copied text available until it is pasted or taken over \
                     (Ctrl-C to stop)..."
                );
            }
            session.runner.hand_over_clipboard();
        }
    }

    Ok(if session.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

struct Session<C: Clipboard> {
    state: AppState,
    runner: EffectRunner<C>,
    last_progress: Option<String>,
    failed: bool,
}

impl<C: Clipboard> Session<C> {
    fn new(state: AppState, runner: EffectRunner<C>) -> Self {
        Self {
            state,
            runner,
            last_progress: None,
            failed: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            self.render_progress();
        }
    }

    fn render_progress(&mut self) {
        let progress = render::render_progress(&self.state.view());
        if progress.is_some() && progress != self.last_progress {
            if let Some(line) = &progress {
                eprintln!("{line}");
            }
        }
        self.last_progress = progress;
    }

    /// Prints and dismisses the current notice, remembering errors.
    fn report_notice(&mut self) {
        let view = self.state.view();
        let Some(line) = render::render_notice(&view) else {
            return;
        };
        match view.notice.as_ref().map(|notice| notice.severity) {
            Some(Severity::Error) => {
                self.failed = true;
                eprintln!("{line}");
            }
            _ => println!("{line}"),
        }
        self.dispatch(Msg::NoticeDismissed);
    }

    /// Exports finish synchronously, but other messages such as an interrupt
    /// may be queued ahead of the outcome. Returns whether the export worked.
    fn wait_for_export(&mut self, msg_rx: &mpsc::Receiver<Msg>) -> anyhow::Result<bool> {
        loop {
            let msg = msg_rx
                .recv_timeout(Duration::from_secs(5))
                .context("no export outcome reported")?;
            let succeeded = match &msg {
                Msg::ExportFinished(ExportOutcome::Failed(_)) => Some(false),
                Msg::ExportFinished(_) => Some(true),
                _ => None,
            };
            self.dispatch(msg);
            if let Some(succeeded) = succeeded {
                self.report_notice();
                return Ok(succeeded);
            }
        }
    }
}

/// First Ctrl-C cancels the search; a second one, or any Ctrl-C once the
/// search is over, exits immediately.
fn spawn_interrupt_listener(msg_tx: mpsc::Sender<Msg>, search_over: Arc<AtomicBool>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                scout_error!("Ctrl-C handling unavailable: {}", err);
                return;
            }
        };

        let mut interrupted = false;
        while runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            if interrupted || search_over.load(Ordering::SeqCst) {
                scout_warn!("Interrupted; exiting");
                std::process::exit(130);
            }
            interrupted = true;
            scout_info!("Interrupted; cancelling search");
            if msg_tx.send(Msg::CancelClicked).is_err() {
                return;
            }
        }
    });
}
