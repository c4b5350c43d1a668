use anyhow::{Context, Result};
use cadence::app::cli::Args;
use cadence::app::config::{AppConfig, PersistentState};
use cadence::app::events::AppEvent;
use cadence::app::{input_handler, App};
use cadence::catalog::{resolve_track_spec, LocatorSource};
use cadence::logging;
use cadence::player::{EngineOptions, MpvBackend, PlaybackEngine};
use cadence::remote::{self, ControlFifo, RemoteAdapter, TmuxStatus};
use cadence::ui;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    let args = Args::parse();

    if args.generate_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let (config, state) = AppConfig::load(args.config.as_deref())?;
    let _log_guard = logging::init(&AppConfig::get_log_dir(), args.log_level.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting cadence");

    // 1. Engine 🎧
    let backend = MpvBackend::spawn(&config.mpv.options())
        .with_context(|| format!("starting {}", config.mpv.binary))?;
    let options = EngineOptions {
        ui_event_buffer: config.playback.ui_event_buffer,
        ..Default::default()
    };
    let (engine, mut player_events) = PlaybackEngine::start(Arc::new(backend), options)?;
    if let Err(e) = engine.set_volume(state.volume as i64) {
        warn!("could not restore volume: {}", e);
    }

    // 2. Initial queue
    let locator = config.server.locator();
    for spec in &args.tracks {
        match resolve_track_spec(spec, locator.as_ref().map(|l| l as &dyn LocatorSource)) {
            Some(item) => engine.add_to_queue(item),
            None => warn!(%spec, "could not resolve track"),
        }
    }
    if args.play && !engine.queue().is_empty() {
        if let Err(e) = engine.pause() {
            warn!("could not start playback: {}", e);
        }
    }

    // 3. Remote surfaces
    let mut adapters: Vec<Box<dyn RemoteAdapter>> = Vec::new();
    if !args.no_remote {
        if config.remote.tmux_status {
            adapters.push(Box::new(TmuxStatus::new()));
        }
        if let Some(path) = &config.remote.control_fifo {
            adapters.push(Box::new(ControlFifo::new(path)));
        }
        remote::register_all(&mut adapters, engine.clone());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (tx, mut rx) = mpsc::channel(100);

    // Input Event Task
    let tx_input = tx.clone();
    let input_task = tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if tx_input.send(AppEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // Player Event Task
    let tx_player = tx.clone();
    let player_task = tokio::spawn(async move {
        while let Some(event) = player_events.recv().await {
            if tx_player.send(AppEvent::Player(event)).await.is_err() {
                break;
            }
        }
    });

    // Animation Tick Task ⚡
    let tx_tick = tx;
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(33));
        loop {
            interval.tick().await;
            if tx_tick.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    let mut app = App::new(&config);
    app.theme = ui::theme::load_theme(&AppConfig::get_config_dir().join("theme.toml"));
    app.status = engine.status();
    app.sync_queue(engine.queue());

    let result = run(&mut terminal, &mut app, &engine, &mut rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the forwarder's receiver unblocks the event loop's sends
    drop(rx);
    for task in [input_task, player_task, tick_task] {
        task.abort();
        let _ = task.await;
    }

    // Save state on exit
    let saved = PersistentState {
        volume: engine.status().volume,
    };
    if let Err(e) = saved.save() {
        warn!("could not save state: {:#}", e);
    }

    engine.quit();
    drop(adapters);
    let joined = engine.clone();
    if tokio::task::spawn_blocking(move || joined.join()).await.is_err() {
        warn!("engine join task failed");
    }
    info!("bye");

    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    engine: &PlaybackEngine,
    rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    while app.is_running {
        terminal.draw(|f| ui::ui(f, app))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                input_handler::handle_key(key, app, engine);
            }
            AppEvent::Input(_) => {}
            AppEvent::Player(event) => {
                app.apply_player_event(event);
                app.sync_queue(engine.queue());
            }
            AppEvent::Tick => app.on_tick(),
        }
    }
    Ok(())
}
