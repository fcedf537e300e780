use std::io;
use std::time::Instant;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;

use photowall_core::{load_photos, Viewport, WallOptions, WallWidth};
use photowall_tui::{
    event::{AppEvent, EventHandler, ImageLoadResult},
    images::load_image,
    input::{handle_key_event, Action},
    widgets::{StatusBarWidget, WallWidget},
    App,
};

use crate::RunArgs;

/// Default displacement per frame in cells; a full cell per frame is far
/// too fast at a 60Hz logical rate
const DEFAULT_CELL_SPEED: f64 = 0.25;

pub async fn run(args: RunArgs) -> Result<()> {
    let photos = load_photos(&args.photos)?;

    // Terminal cells are the layout unit: one cell of width or height
    // maps to one layout unit, so the config is cell-scaled.
    let (term_width, term_height) = crossterm::terminal::size()?;
    let viewport = Viewport::new(term_width as u32, term_height.saturating_sub(1) as u32);

    let options = WallOptions {
        width: Some(WallWidth::Auto),
        cols_width: Some(args.lane_width),
        item_height: Some(args.item_size),
        height: Some(viewport.height),
        gap: Some(1),
        direction: args.direction.clone(),
        variable_speed: Some(args.variable_speed),
        pause_all_on_hover: Some(args.pause_all),
        stop_on_hover: Some(!args.pause_all),
        lazy_load: Some(!args.eager),
        lazy_load_threshold: Some(args.item_size),
        animation_speed: Some(args.speed.unwrap_or(DEFAULT_CELL_SPEED)),
        data: Some(photos),
        ..Default::default()
    };

    let mut app = App::bind(options, viewport)
        .ok_or_else(|| anyhow!("could not bind the wall; is the photo list empty?"))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetTitle("Photowall")
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // ~60Hz logical frame rate
    let event_handler = EventHandler::new(16);

    // Channel for async image loading results
    let (img_tx, mut img_rx) = mpsc::unbounded_channel::<ImageLoadResult>();

    // Eager walls request everything on the first pass
    for url in app.eager_urls() {
        spawn_image_load(url, img_tx.clone());
    }

    loop {
        // Process any completed image loads (non-blocking)
        while let Ok(result) = img_rx.try_recv() {
            app.handle_image_result(result);
        }

        // Advance the animation and collect newly approaching images
        for url in app.on_tick(Instant::now()) {
            spawn_image_load(url, img_tx.clone());
        }

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            WallWidget::render(frame, layout[0], app);
            StatusBarWidget::render(frame, layout[1], app);
        })?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => match handle_key_event(key) {
                    Action::Quit => app.should_quit = true,
                    Action::TogglePause => app.toggle_pause(),
                    Action::Refresh => app.refresh(),
                    Action::None => {}
                },
                AppEvent::Mouse(mouse) => app.on_mouse(mouse),
                AppEvent::Resize(w, h) => {
                    app.on_resize(Viewport::new(w as u32, h.saturating_sub(1) as u32));
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_image_load(url: String, tx: mpsc::UnboundedSender<ImageLoadResult>) {
    tokio::spawn(async move {
        let result = match load_image(&url).await {
            Ok(image) => ImageLoadResult::Success { url, image },
            Err(error) => ImageLoadResult::Failure { url, error },
        };
        // Receiver dropping just means the UI is gone
        let _ = tx.send(result);
    });
}
