pub mod events;
pub mod state;
pub mod ui;
pub mod worker;

use anyhow::{Result, anyhow};
use log::info;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyEventKind},
};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crate::api::MailTransport;
use crate::session::SharedSession;
use crate::terminal::state::App;
use crate::terminal::worker::{Done, Job};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_tui(session: SharedSession, transport: Arc<dyn MailTransport>, page_size: u32) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("{e}"))?;

    let (tx, rx) = mpsc::channel();
    let (mut app, first) = App::start(session, page_size);
    if let Some(job) = first {
        worker::spawn(transport.clone(), job, tx.clone());
    }

    let terminal = ratatui::init();
    let result = run(terminal, &mut app, &transport, &tx, &rx);
    ratatui::restore();

    info!("terminal closed");
    result
}

fn run(
    mut terminal: DefaultTerminal,
    app: &mut App,
    transport: &Arc<dyn MailTransport>,
    tx: &Sender<Done>,
    rx: &Receiver<Done>,
) -> Result<()> {
    let start = |job: Job| worker::spawn(transport.clone(), job, tx.clone());

    while !app.quit {
        terminal.draw(|f| ui::render(f, app))?;

        while let Ok(done) = rx.try_recv() {
            if let Some(job) = app.on_done(done) {
                start(job);
            }
        }

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(job) = events::handle_key(key, app)
        {
            start(job);
        }

        app.tick(Instant::now());
    }
    Ok(())
}
