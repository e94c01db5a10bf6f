//! Terminal viewer (default binary).
//!
//! Connects to the game server, feeds frames through the pipeline and shows
//! the raster surface in the terminal using half-block cells.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rogue_view::keys::{command_for, Command};
use rogue_view::net::{ConnectionConfig, NetClient, NetEvent};
use rogue_view::raster::{SpriteSheet, TerminalPresenter};
use rogue_view::types::RENDER_TICK_MS;
use rogue_view::viewer::{IngestOutcome, TickOutcome, ViewerConfig, ViewerContext};

fn main() -> Result<()> {
    let net_config = ConnectionConfig::from_env();
    let viewer_config = ViewerConfig {
        view: net_config.view,
        ..ViewerConfig::from_env()
    };
    init_tracing(&viewer_config)?;

    let sprites = match SpriteSheet::load_dir(&viewer_config.tiles_dir, viewer_config.sprite_size) {
        Ok(sheet) => {
            info!(count = sheet.len(), dir = %viewer_config.tiles_dir.display(), "loaded tile images");
            sheet
        }
        Err(err) => {
            warn!(error = %err, "tile images unavailable, drawing backgrounds only");
            SpriteSheet::new(viewer_config.sprite_size)
        }
    };

    info!(address = %net_config.address(), view = net_config.view.as_wire(), "starting viewer");
    let mut client = NetClient::start(net_config)?;
    let mut ctx = ViewerContext::new(&viewer_config, sprites);

    let mut presenter = TerminalPresenter::new();
    presenter.enter()?;

    let result = run(&mut presenter, &mut client, &mut ctx);

    // Always try to restore terminal state.
    let _ = presenter.exit();
    client.shutdown();
    result
}

fn init_tracing(config: &ViewerConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("opening log file {}", config.log_path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn run(presenter: &mut TerminalPresenter, client: &mut NetClient, ctx: &mut ViewerContext) -> Result<()> {
    let started = Instant::now();
    let tick = Duration::from_millis(RENDER_TICK_MS);
    let mut needs_present = true;

    loop {
        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match command_for(key) {
                    Some(Command::Quit) => return Ok(()),
                    Some(Command::Reconnect) => {
                        info!("reconnect requested");
                        client.teardown();
                    }
                    Some(Command::Redraw) => {
                        presenter.invalidate();
                        needs_present = true;
                    }
                    None => {}
                },
                Event::Resize(_, _) => {
                    presenter.invalidate();
                    needs_present = true;
                }
                _ => {}
            }
        }

        while let Some(net_event) = client.try_recv() {
            match net_event {
                NetEvent::Connected => info!("connected"),
                NetEvent::Message(msg) => {
                    if ctx.ingest(msg) == IngestOutcome::Overflow {
                        client.teardown();
                    }
                }
                NetEvent::Disconnected { reason } => {
                    info!(%reason, "disconnected, resetting session");
                    ctx.reset();
                }
            }
        }

        let now_ms = started.elapsed().as_millis() as u64;
        match ctx.tick(now_ms) {
            TickOutcome::Idle | TickOutcome::FrameSkipped { .. } => {}
            TickOutcome::FrameDrawn { .. } | TickOutcome::CameraStep { .. } => needs_present = true,
        }

        if needs_present {
            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            presenter.present(ctx.surface(), cols, rows)?;
            needs_present = false;
        }
    }
}
