use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Form, Screen};
use crate::auth::Auth;
use crate::game::{Game, OutcomeKind};

const TITLE_ART: &str = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║        ███████╗ █████╗  ██████╗████████╗                  ║
    ║        ██╔════╝██╔══██╗██╔════╝╚══██╔══╝                  ║
    ║        █████╗  ███████║██║        ██║                     ║
    ║        ██╔══╝  ██╔══██║██║        ██║                     ║
    ║        ██║     ██║  ██║╚██████╗   ██║                     ║
    ║        ╚═╝     ╚═╝  ╚═╝ ╚═════╝   ╚═╝                     ║
    ║                                                           ║
    ║               ██████╗ ██╗   ██╗███████╗███████╗████████╗  ║
    ║              ██╔═══██╗██║   ██║██╔════╝██╔════╝╚══██╔══╝  ║
    ║              ██║   ██║██║   ██║█████╗  ███████╗   ██║     ║
    ║              ██║▄▄ ██║██║   ██║██╔══╝  ╚════██║   ██║     ║
    ║              ╚██████╔╝╚██████╔╝███████╗███████║   ██║     ║
    ║               ╚══▀▀═╝  ╚═════╝ ╚══════╝╚══════╝   ╚═╝     ║
    ║                                                           ║
    ║             "Question everything you scroll past"         ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

pub fn draw_ui(f: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Loading | Screen::Title => draw_title_screen(f, app),
        Screen::Leaderboard => draw_leaderboard(f, app),
        Screen::Profile => draw_profile(f, app),
        screen => {
            if let Some(game) = &app.game {
                draw_game(f, app, game, screen);
            }
        }
    }

    if let Some(form) = &app.form {
        draw_form(f, form);
    }
}

fn message_area(f: &mut Frame, app: &App, area: Rect, title: &str) {
    let message = Paragraph::new(app.message.as_str())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false })
        .style(app.message_style);
    f.render_widget(message, area);
}

fn status_bar(game: &Game) -> Line<'static> {
    let progress = game.progress();
    let levels = game.story().levels.len();
    let lost = game.rules().initial_lives.saturating_sub(progress.lives);
    let hearts = format!(
        "{}{}",
        "♥ ".repeat(progress.lives as usize),
        "♡ ".repeat(lost as usize)
    );
    let lives_color = if progress.lives > 1 { Color::Green } else { Color::Red };

    let mut spans = vec![
        Span::styled(
            " FACT QUEST ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", game.story().title),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Level {}/{} ", progress.level + 1, levels),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if game.scenario().is_some() {
        spans.push(Span::styled(
            format!(
                " Scenario {}/{} ",
                progress.scenario_index + 1,
                game.scenarios().len()
            ),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.extend([
        Span::raw("  "),
        Span::styled(
            format!(" Score: {} ", progress.score),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(format!(" {}", hearts), Style::default().fg(lives_color)),
    ]);
    Line::from(spans)
}

fn draw_game(f: &mut Frame, app: &App, game: &Game, screen: Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(9),
        ])
        .split(f.area());

    let status = Paragraph::new(status_bar(game)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, chunks[0]);

    match screen {
        Screen::Choosing | Screen::Outcome => draw_scenario(f, app, game, chunks[1]),
        Screen::LevelIntro => {
            let level = game.level();
            let title = level.map_or("Next level", |l| l.title.as_str());
            let intro = level
                .and_then(|l| l.intro_text.as_deref())
                .unwrap_or("A new set of stories is waiting to be checked.");
            let body = Paragraph::new(vec![
                Line::from(Span::styled(
                    title.to_string(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::raw(""),
                Line::raw(intro.to_string()),
            ])
            .block(Block::default().borders(Borders::ALL).title(" New Level "))
            .wrap(Wrap { trim: false });
            f.render_widget(body, chunks[1]);
        }
        _ => draw_summary(f, app, game, screen, chunks[1]),
    }

    let title = match screen {
        Screen::Outcome => match game.selection().map(|s| s.outcome.kind) {
            Some(OutcomeKind::Correct) => " CORRECT ",
            Some(OutcomeKind::Partially) => " PARTIALLY CORRECT ",
            _ => " WRONG ",
        },
        Screen::LevelComplete => " LEVEL COMPLETE! ",
        Screen::End => " THE END ",
        Screen::GameOver => " GAME OVER ",
        _ => " Newsroom ",
    };
    message_area(f, app, chunks[2], title);
}

fn draw_scenario(f: &mut Frame, app: &App, game: &Game, area: Rect) {
    let Some(scenario) = game.scenario() else {
        return;
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let mut description = vec![Line::raw(scenario.description.clone())];
    if let Some(image) = &scenario.image {
        description.push(Line::raw(""));
        description.push(Line::styled(
            format!("[image: {image}]"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let narrative = Paragraph::new(description)
        .block(Block::default().borders(Borders::ALL).title(" The Situation "))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(narrative, columns[0]);

    if scenario.actions.is_empty() {
        let empty = Paragraph::new(vec![
            Line::styled(
                "This scenario has no choices to make.",
                Style::default().fg(Color::Red),
            ),
            Line::raw(""),
            Line::raw("Press Esc to return to the title screen."),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Your Move [Esc: title] "))
        .wrap(Wrap { trim: false });
        f.render_widget(empty, columns[1]);
        return;
    }

    let selected = game.selection().map(|s| s.action.id);
    let lines: Vec<Line> = scenario
        .actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let marker = if i == app.action_cursor { "▶" } else { " " };
            let style = match selected {
                Some(id) if id == action.id => Style::default()
                    .fg(Color::Black)
                    .bg(if action.is_correct { Color::Green } else { Color::Red }),
                Some(_) => Style::default().fg(Color::DarkGray),
                None if i == app.action_cursor => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                None => Style::default().fg(Color::White),
            };
            Line::styled(format!("{marker} {}. {}", i + 1, action.text), style)
        })
        .collect();
    let help = if selected.is_some() {
        " Your Move [ENTER: continue] "
    } else {
        " Your Move [↑/↓ + ENTER | 1-9 | l: leaderboard | p: profile | Esc: title] "
    };
    let actions = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(help))
        .wrap(Wrap { trim: false });
    f.render_widget(actions, columns[1]);
}

fn draw_summary(f: &mut Frame, app: &App, game: &Game, screen: Screen, area: Rect) {
    let progress = game.progress();
    let mut lines = vec![
        Line::raw(""),
        Line::raw(format!("  Score:            {:>4}", progress.score)),
        Line::raw(format!("  Correct answers:  {:>4}", progress.correct_answers)),
        Line::raw(format!("  Lives remaining:  {:>4}", progress.lives)),
        Line::raw(format!(
            "  Levels cleared:   {:>4}",
            match screen {
                Screen::End => game.story().levels.len(),
                _ => progress.level + usize::from(screen == Screen::LevelComplete),
            }
        )),
    ];

    if let Some(earned) = &app.last_earned {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("  ★ Latest power-up: {}", earned.power_up.name),
            Style::default().fg(Color::Magenta),
        ));
    }

    if matches!(screen, Screen::End | Screen::GameOver) {
        if let Some(inviter) = &app.inviter {
            let verdict = if progress.score > inviter.highest_score {
                "You beat them!"
            } else if progress.score == inviter.highest_score {
                "A tie!"
            } else {
                "Not this time."
            };
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                format!(
                    "  {} scored {}. {}",
                    inviter.username, inviter.highest_score, verdict
                ),
                Style::default().fg(Color::Cyan),
            ));
        }
        if let Some(token) = &app.invite_token {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                format!("  Invite code: {token}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "  ENTER: back to title  •  i: invite a friend  •  l: leaderboard  •  q: quit",
            Style::default().fg(Color::DarkGray),
        ));
    } else if screen == Screen::LevelComplete {
        let hint = if game.next_level_ready() {
            "  ENTER: continue  •  Esc: title"
        } else if app.load_pending() {
            "  r: retry loading the next level  •  Esc: title"
        } else {
            "  The next level is unavailable.  Esc: back to title"
        };
        lines.push(Line::raw(""));
        lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
    }

    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Debrief "));
    f.render_widget(summary, area);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let items = if app.game.is_some() {
        app.menu_items()
    } else {
        Vec::new()
    };

    let mut constraints = vec![Constraint::Length(22)];
    constraints.extend(items.iter().map(|_| Constraint::Length(1)));
    constraints.extend([Constraint::Length(2), Constraint::Length(4), Constraint::Min(1)]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let title = Paragraph::new(TITLE_ART)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    for (i, item) in items.iter().enumerate() {
        let style = if i == app.menu_selection {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let entry = Paragraph::new(format!("  {}  ", item.label()))
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(entry, chunks[1 + i]);
    }

    let base = 1 + items.len();
    let mut info = vec![Line::styled(app.message.clone(), app.message_style)];
    if let Some(inviter) = &app.inviter {
        info.push(Line::styled(
            format!(
                "{} invited you. Their best score: {}",
                inviter.username, inviter.highest_score
            ),
            Style::default().fg(Color::Cyan),
        ));
    }
    if app.auth.is_authenticated() {
        let name = app.profile.as_ref().map_or("player", |p| p.username.as_str());
        info.push(Line::styled(
            format!("Logged in as {name}"),
            Style::default().fg(Color::Green),
        ));
    }
    let info = Paragraph::new(info)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(info, chunks[base + 1]);

    let help = if app.game.is_some() {
        "↑/↓ to select  •  ENTER to confirm  •  q to quit"
    } else {
        "r to retry  •  q to quit"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[base + 2]);
}

fn draw_leaderboard(f: &mut Frame, app: &App) {
    let me = app.profile.as_ref().map(|p| p.username.as_str());
    let mut lines = vec![Line::styled(
        format!("  {:<4} {:<24} {:>8}", "#", "Player", "Score"),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (rank, entry) in app.leaderboard.iter().enumerate() {
        let style = if Some(entry.username.as_str()) == me {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::styled(
            format!("  {:<4} {:<24} {:>8}", rank + 1, entry.username, entry.score),
            style,
        ));
    }
    if app.leaderboard.is_empty() {
        lines.push(Line::styled(
            "  No scores yet. Be the first!",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Top Fact-Checkers [Esc: back] "),
    );
    f.render_widget(board, f.area());
}

fn draw_profile(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(5), Constraint::Length(5)])
        .split(f.area());

    let details = match &app.profile {
        Some(user) => vec![
            Line::styled(
                user.username.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Line::raw(user.email.clone().unwrap_or_default()),
            Line::raw(format!(
                "Highest score: {}",
                user.highest_score.map_or("-".to_string(), |s| s.to_string())
            )),
        ],
        None => vec![Line::raw("Not logged in.")],
    };
    let details = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title(" Profile "));
    f.render_widget(details, chunks[0]);

    let mut lines: Vec<Line> = app
        .active_power_ups
        .iter()
        .enumerate()
        .map(|(i, held)| {
            let style = if i == app.power_up_cursor {
                Style::default().fg(Color::Black).bg(Color::Magenta)
            } else {
                Style::default().fg(Color::Magenta)
            };
            Line::styled(
                format!("★ {}: {}", held.power_up.name, held.power_up.description),
                style,
            )
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::styled(
            "No active power-ups. Keep answering correctly to earn some.",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let power_ups = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Power-ups [↑/↓ select | u: use | o: log out | Esc: back] "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(power_ups, chunks[1]);

    message_area(f, app, chunks[2], " Messages ");
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_form(f: &mut Frame, form: &Form) {
    let height = form.fields.len() as u16 * 3 + 4;
    let area = centered(f.area(), 60, height);
    f.render_widget(Clear, area);

    let outer = Block::default().borders(Borders::ALL).title(form.title());
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        f.render_widget(field, rows[i]);
    }
    if let Some(error) = &form.error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        f.render_widget(error, rows[form.fields.len()]);
    }
}
