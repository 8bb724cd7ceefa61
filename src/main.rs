mod api;
mod app;
mod auth;
mod config;
mod game;
mod save;
mod source;
mod story;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::io;

use app::{App, Screen};
use config::{Cli, Config};

fn setup_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    WriteLogger::init(
        config.log_level,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        file,
    )
    .map_err(|e| anyhow::anyhow!("initialising logger: {e}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    setup_logging(&config)?;
    log::info!("api at {}, story {}", config.api_url, config.story_id);

    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result?;

    if let Some(game) = &app.game {
        match app.screen() {
            Screen::End => {
                println!("\nStory complete with {} points. Stay curious!\n", game.progress().score);
            }
            Screen::GameOver => {
                println!("\nGame over at {} points. Check your sources next time.\n", game.progress().score);
            }
            _ => {}
        }
    }

    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}
