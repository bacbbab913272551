use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use taskmon_core::{update, AppState, Effect, Msg, ViewLocation};
use taskmon_logging::{taskmon_info, taskmon_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui;
use super::ui::commands::Command;

const TICK: Duration = Duration::from_millis(250);

pub struct RunOptions {
    pub location: ViewLocation,
    pub search_query: String,
    /// Keep running and read navigation commands from stdin.
    pub watch: bool,
}

pub fn run_app(config: &AppConfig, options: RunOptions) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.monitor_settings(), msg_tx.clone())?;
    let quit = Arc::new(AtomicBool::new(false));

    if options.watch {
        println!("{}", ui::commands::HELP);
        spawn_command_reader(msg_tx, quit.clone());
    }

    let mut app = App {
        state: AppState::with_preferences(options.search_query, config.sort_by.clone()),
        runner,
        pending_loads: 0,
        last_render: Vec::new(),
    };
    taskmon_info!("Opening {} against {}", options.location, config.server);
    app.dispatch(Msg::PageLoaded {
        location: options.location,
    });

    loop {
        let msg = match msg_rx.recv_timeout(TICK) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => Msg::Tick,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        app.dispatch(msg);

        if quit.load(Ordering::SeqCst) {
            break;
        }
        if !options.watch && app.is_settled() {
            break;
        }
    }

    taskmon_info!("Exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    /// Gallery requests sent to the engine and not yet answered.
    pending_loads: usize,
    last_render: Vec<String>,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        if matches!(msg, Msg::GalleryLoaded { .. }) {
            self.pending_loads = self.pending_loads.saturating_sub(1);
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.pending_loads += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::LoadGallery(_)))
            .count();
        self.runner.enqueue(effects);

        if state.consume_dirty() {
            self.render(&state);
        }
        self.state = state;
    }

    fn render(&mut self, state: &AppState) {
        let lines = ui::render::render(&state.view());
        if lines != self.last_render {
            for line in &lines {
                println!("{line}");
            }
            self.last_render = lines;
        }
    }

    /// No job, no negotiation and no gallery request in flight.
    fn is_settled(&self) -> bool {
        self.state.job().is_none() && !self.state.is_negotiating() && self.pending_loads == 0
    }
}

fn spawn_command_reader(msg_tx: mpsc::Sender<Msg>, quit: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match ui::commands::parse(&line) {
                Ok(Some(Command::Dispatch(msg))) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                Ok(Some(Command::Quit)) => break,
                Ok(None) => {}
                Err(err) => {
                    taskmon_warn!("Rejected command {line:?}: {err}");
                    println!("{err}");
                }
            }
        }
        quit.store(true, Ordering::SeqCst);
        let _ = msg_tx.send(Msg::NoOp);
    });
}
