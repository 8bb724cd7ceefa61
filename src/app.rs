use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, info, warn};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use std::rc::Rc;
use tui_textarea::TextArea;

use crate::api::types::{Credentials, InviterScore, Registration};
use crate::api::{
    ApiClient, ApiError, BaseUrl, LeaderboardEntry, TcpTransport, UserPowerUp, UserProfile,
};
use crate::auth::{Auth, AuthContext, TokenStore};
use crate::config::Config;
use crate::game::{
    AuthorizedPowerUps, EarnedPowerUp, Game, GameError, OutcomeKind, Phase, PowerUpLedger,
    SideView, Signal,
};
use crate::save::{ResumeStore, Snapshot};
use crate::source::{self, StoryPack, StorySource};

/// Which view to draw and which keys apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Title,
    Choosing,
    Outcome,
    LevelIntro,
    LevelComplete,
    End,
    GameOver,
    Leaderboard,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    NewGame,
    Continue,
    Leaderboard,
    Profile,
    Login,
    Register,
    Logout,
    Quit,
}

impl MenuOption {
    pub fn label(self) -> &'static str {
        match self {
            MenuOption::NewGame => "NEW GAME",
            MenuOption::Continue => "CONTINUE",
            MenuOption::Leaderboard => "LEADERBOARD",
            MenuOption::Profile => "PROFILE",
            MenuOption::Login => "LOG IN",
            MenuOption::Register => "REGISTER",
            MenuOption::Logout => "LOG OUT",
            MenuOption::Quit => "QUIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

pub struct Form<'a> {
    pub kind: FormKind,
    labels: &'static [&'static str],
    pub fields: Vec<TextArea<'a>>,
    pub focus: usize,
    pub error: Option<String>,
}

impl<'a> Form<'a> {
    fn new(kind: FormKind) -> Self {
        let labels: &'static [&'static str] = match kind {
            FormKind::Login => &["Username", "Password"],
            FormKind::Register => &["Username", "Email", "Password"],
        };
        let fields = labels
            .iter()
            .map(|label| {
                let mut field = TextArea::default();
                field.set_cursor_line_style(Style::default());
                if *label == "Password" {
                    field.set_mask_char('•');
                }
                field
            })
            .collect();
        let mut form = Form {
            kind,
            labels,
            fields,
            focus: 0,
            error: None,
        };
        form.refresh();
        form
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Login => " Log in [Tab: next field | Enter: submit | Esc: cancel] ",
            FormKind::Register => " Register [Tab: next field | Enter: submit | Esc: cancel] ",
        }
    }

    fn refresh(&mut self) {
        for (i, (field, label)) in self.fields.iter_mut().zip(self.labels).enumerate() {
            let (border, cursor) = if i == self.focus {
                (
                    Style::default().fg(Color::Yellow),
                    Style::default().add_modifier(Modifier::REVERSED),
                )
            } else {
                (Style::default().fg(Color::DarkGray), Style::default())
            };
            field.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {label} ")),
            );
            field.set_cursor_style(cursor);
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
        self.refresh();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        self.refresh();
    }

    fn value(&self, index: usize) -> String {
        self.fields[index].lines().join("").trim().to_string()
    }
}

pub struct App<'a> {
    pub config: Config,
    api: ApiClient,
    source: Box<dyn StorySource>,
    pub auth: AuthContext,
    resume: ResumeStore,
    pub resume_available: bool,
    pub game: Option<Game>,
    pub menu_selection: usize,
    pub action_cursor: usize,
    pub message: String,
    pub message_style: Style,
    pub form: Option<Form<'a>>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub profile: Option<UserProfile>,
    pub active_power_ups: Vec<UserPowerUp>,
    pub power_up_cursor: usize,
    power_ups: PowerUpLedger,
    pub last_earned: Option<EarnedPowerUp>,
    pub inviter: Option<InviterScore>,
    pub invite_token: Option<String>,
    pending: Option<Signal>,
}

impl<'a> App<'a> {
    pub fn new(config: Config) -> Result<Self> {
        let base = BaseUrl::parse(&config.api_url)?;
        let api = ApiClient::new(Rc::new(TcpTransport::new(base, config.timeout)));
        let source: Box<dyn StorySource> = match &config.stories_dir {
            Some(dir) => Box::new(StoryPack { dir: dir.clone() }),
            None => Box::new(api.clone()),
        };
        Ok(App::with_backend(config, api, source))
    }

    /// Build on an existing backend client and story source, then load the
    /// opening data.
    pub fn with_backend(config: Config, api: ApiClient, source: Box<dyn StorySource>) -> Self {
        let auth = AuthContext::new(api.clone(), TokenStore::new(&config.data_dir));
        let resume = ResumeStore::new(&config.data_dir);
        let resume_available = resume
            .load_for(config.story_id)
            .unwrap_or_else(|e| {
                warn!("ignoring saved progress: {}", e);
                None
            })
            .is_some();

        let mut app = App {
            config,
            api,
            source,
            auth,
            resume,
            resume_available,
            game: None,
            menu_selection: 0,
            action_cursor: 0,
            message: String::new(),
            message_style: Style::default().fg(Color::Yellow),
            form: None,
            leaderboard: Vec::new(),
            profile: None,
            active_power_ups: Vec::new(),
            power_up_cursor: 0,
            power_ups: PowerUpLedger::default(),
            last_earned: None,
            inviter: None,
            invite_token: None,
            pending: None,
        };
        app.load_inviter();
        app.load_profile();
        app.run_signal(Signal::RequestInitialData);
        app
    }

    pub fn screen(&self) -> Screen {
        let Some(game) = &self.game else {
            return Screen::Loading;
        };
        match game.phase() {
            Phase::Start => Screen::Title,
            Phase::Playing { selection: None } => Screen::Choosing,
            Phase::Playing { selection: Some(_) } => Screen::Outcome,
            Phase::LevelIntro => Screen::LevelIntro,
            Phase::LevelComplete { .. } => Screen::LevelComplete,
            Phase::End => Screen::End,
            Phase::GameOver => Screen::GameOver,
            Phase::Leaderboard { .. } => Screen::Leaderboard,
            Phase::Profile { .. } => Screen::Profile,
        }
    }

    pub fn menu_items(&self) -> Vec<MenuOption> {
        let mut items = vec![MenuOption::NewGame];
        if self.resume_available {
            items.push(MenuOption::Continue);
        }
        items.push(MenuOption::Leaderboard);
        if self.auth.is_authenticated() {
            items.extend([MenuOption::Profile, MenuOption::Logout]);
        } else {
            items.extend([MenuOption::Login, MenuOption::Register]);
        }
        items.push(MenuOption::Quit);
        items
    }

    pub fn load_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn say(&mut self, text: impl Into<String>, color: Color) {
        self.message = text.into();
        self.message_style = Style::default().fg(color);
    }

    fn report_game(&mut self, err: GameError) {
        warn!("{}", err);
        self.say(format!("System error: {}", err), Color::Magenta);
    }

    fn report_api(&mut self, what: &str, err: ApiError) {
        error!("failed to load {}: {}", what, err);
        let was_authenticated = self.auth.is_authenticated();
        self.auth.observe(&err);
        if was_authenticated && !self.auth.is_authenticated() {
            self.say("Your session has expired. Please log in again.", Color::Red);
        } else {
            self.say(format!("Unable to load {what}."), Color::Red);
        }
    }

    fn load_failed(&mut self, signal: Signal, what: &str, err: anyhow::Error) {
        error!("failed to load {}: {:#}", what, err);
        if let Some(api_err) = err.downcast_ref::<ApiError>() {
            self.auth.observe(api_err);
        }
        self.pending = Some(signal);
        self.say(format!("Unable to load {what}. Press r to retry."), Color::Red);
    }

    /// Carry out a data request made by the game.
    fn run_signal(&mut self, signal: Signal) {
        match signal {
            Signal::RequestInitialData => {
                match source::load_opening(self.source.as_ref(), self.config.story_id) {
                    Ok((story, scenarios)) => {
                        self.pending = None;
                        info!("loaded story {} ({} levels)", story.id, story.levels.len());
                        let reloaded = match &mut self.game {
                            Some(game) => game.reload(story, scenarios),
                            None => {
                                self.game = Some(Game::new(story, scenarios, self.config.rules));
                                Ok(())
                            }
                        };
                        match reloaded {
                            Ok(()) => self.say("Choose NEW GAME to begin.", Color::Yellow),
                            Err(e) => self.report_game(e),
                        }
                    }
                    Err(e) => self.load_failed(signal, "the story", e),
                }
            }
            Signal::RequestLevelData { level_id, .. } => {
                let Some(story_id) = self.game.as_ref().map(|g| g.story().id) else {
                    return;
                };
                match self.source.scenarios(story_id, level_id) {
                    Ok(scenarios) => {
                        self.pending = None;
                        let delivered = match &mut self.game {
                            Some(game) => game.deliver_level_data(scenarios),
                            None => return,
                        };
                        match delivered {
                            Ok(()) => self.say(
                                "Level complete! Press ENTER to continue.",
                                Color::Green,
                            ),
                            Err(GameError::EmptyLevel) => {
                                warn!("level {} has no scenarios", level_id);
                                self.say(
                                    "The next level has no scenarios. Press Esc to return to the title screen.",
                                    Color::Red,
                                );
                            }
                            Err(e) => self.report_game(e),
                        }
                    }
                    Err(e) => self.load_failed(signal, "the next level", e),
                }
            }
        }
    }

    fn retry(&mut self) {
        if let Some(signal) = self.pending.take() {
            self.say("Retrying...", Color::Yellow);
            self.run_signal(signal);
        }
    }

    fn load_inviter(&mut self) {
        let Some(token) = self.config.invite.clone() else {
            return;
        };
        match self.api.inviter_score(&token) {
            Ok(score) => self.inviter = Some(score),
            Err(e) => warn!("invite {} unavailable: {}", token, e),
        }
    }

    /// Fetch the player's profile when a token is held. A rejected token is
    /// dropped here rather than on the first authenticated action.
    fn load_profile(&mut self) {
        let Some(token) = self.auth.current_token().map(str::to_string) else {
            return;
        };
        match self.api.current_user(&token) {
            Ok(user) => {
                info!("signed in as {}", user.username);
                self.profile = Some(user);
            }
            Err(e) => {
                warn!("profile unavailable: {}", e);
                self.auth.observe(&e);
            }
        }
    }

    fn load_power_ups(&mut self) {
        self.power_ups = PowerUpLedger::default();
        let (Some(token), Some(game)) = (self.auth.current_token(), &self.game) else {
            return;
        };
        match self.api.story_power_ups(game.story().id, token) {
            Ok(list) => {
                info!("{} power-ups available", list.len());
                self.power_ups = PowerUpLedger::new(list);
            }
            Err(e) => {
                warn!("power-ups unavailable: {}", e);
                self.auth.observe(&e);
            }
        }
    }

    fn check_power_ups(&mut self) {
        let (Some(token), Some(game)) = (self.auth.current_token(), &self.game) else {
            return;
        };
        let service = AuthorizedPowerUps {
            client: &self.api,
            token,
        };
        match self.power_ups.check(&service, game.progress().correct_answers) {
            Ok(Some(earned)) => {
                self.message.push_str(&format!(
                    "\n\n★ Power-up unlocked: {}. {}",
                    earned.power_up.name, earned.power_up.description
                ));
                self.last_earned = Some(earned);
            }
            Ok(None) => {}
            // Nothing earned; play goes on either way.
            Err(e) => self.auth.observe(&e),
        }
    }

    fn sync_resume(&mut self) {
        let Some(game) = &self.game else {
            return;
        };
        let result = match game.phase() {
            Phase::Playing { .. } => self
                .resume
                .save(&Snapshot {
                    story_id: game.story().id,
                    progress: game.progress().clone(),
                })
                .map(|_| true),
            phase if phase.is_terminal() => self.resume.clear().map(|_| false),
            _ => return,
        };
        match result {
            Ok(available) => self.resume_available = available,
            Err(e) => warn!("could not update saved progress: {}", e),
        }
    }

    fn describe_phase(&mut self) {
        let Some(game) = &self.game else {
            return;
        };
        let (text, color) = match game.phase() {
            Phase::Playing { .. } => ("Choose wisely...".to_string(), Color::Yellow),
            Phase::LevelIntro => ("Press ENTER to begin the level.".to_string(), Color::Cyan),
            Phase::LevelComplete { .. } => ("Level complete! Loading the next level...".to_string(), Color::Green),
            Phase::End => (
                format!("The story is complete! Final score: {}", game.progress().score),
                Color::Green,
            ),
            Phase::GameOver => (
                format!("Out of lives. Final score: {}", game.progress().score),
                Color::Red,
            ),
            _ => return,
        };
        self.say(text, color);
    }

    /// Returns true when the player asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }
        if key.code == KeyCode::Char('r') && self.pending.is_some() {
            self.retry();
            return false;
        }

        match self.screen() {
            Screen::Loading => return matches!(key.code, KeyCode::Char('q') | KeyCode::Esc),
            Screen::Title => return self.handle_menu_key(key),
            Screen::Choosing => self.handle_choice_key(key),
            Screen::Outcome => {
                if key.code == KeyCode::Enter {
                    self.proceed();
                }
            }
            Screen::LevelIntro => {
                if key.code == KeyCode::Enter {
                    self.start_level();
                }
            }
            Screen::LevelComplete => match key.code {
                KeyCode::Enter => self.continue_to_next_level(),
                KeyCode::Esc => self.restart(),
                _ => {}
            },
            Screen::End | Screen::GameOver => match key.code {
                KeyCode::Enter => self.restart(),
                KeyCode::Char('i') => self.create_invite(),
                KeyCode::Char('l') => self.open_leaderboard(),
                KeyCode::Char('q') => return true,
                _ => {}
            },
            Screen::Leaderboard => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.close_side_view();
                }
            }
            Screen::Profile => self.handle_profile_key(key),
        }
        false
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        let items = self.menu_items();
        self.menu_selection = self.menu_selection.min(items.len() - 1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = (self.menu_selection + items.len() - 1) % items.len();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selection = (self.menu_selection + 1) % items.len();
            }
            KeyCode::Enter => return self.activate(items[self.menu_selection]),
            KeyCode::Char('q') => return true,
            _ => {}
        }
        false
    }

    fn activate(&mut self, option: MenuOption) -> bool {
        match option {
            MenuOption::NewGame => self.new_game(),
            MenuOption::Continue => self.resume_game(),
            MenuOption::Leaderboard => self.open_leaderboard(),
            MenuOption::Profile => self.open_profile(),
            MenuOption::Login => self.form = Some(Form::new(FormKind::Login)),
            MenuOption::Register => self.form = Some(Form::new(FormKind::Register)),
            MenuOption::Logout => {
                self.auth.logout();
                self.power_ups = PowerUpLedger::default();
                self.profile = None;
                self.menu_selection = 0;
                self.say("Logged out.", Color::Yellow);
            }
            MenuOption::Quit => return true,
        }
        false
    }

    fn new_game(&mut self) {
        if let Err(e) = self.resume.clear() {
            warn!("could not clear saved progress: {}", e);
        }
        self.resume_available = false;
        let Some(game) = &mut self.game else {
            return;
        };
        match game.start() {
            Ok(()) => {
                self.action_cursor = 0;
                self.last_earned = None;
                self.invite_token = None;
                self.load_power_ups();
                self.sync_resume();
                self.describe_phase();
            }
            Err(e) => self.report_game(e),
        }
    }

    fn load_resumed(&self) -> Result<Option<Game>> {
        let Some(snapshot) = self.resume.load_for(self.config.story_id)? else {
            return Ok(None);
        };
        let story = self.source.story(snapshot.story_id)?;
        let level_id = story
            .level(snapshot.progress.level)
            .map(|l| l.id)
            .ok_or_else(|| anyhow!("saved level {} no longer exists", snapshot.progress.level))?;
        let scenarios = self.source.scenarios(story.id, level_id)?;
        Ok(Some(Game::resume(
            story,
            scenarios,
            self.config.rules,
            snapshot.progress,
        )?))
    }

    fn resume_game(&mut self) {
        match self.load_resumed() {
            Ok(Some(game)) => {
                self.game = Some(game);
                self.action_cursor = 0;
                self.load_power_ups();
                self.describe_phase();
            }
            Ok(None) => {
                self.resume_available = false;
                self.say("No saved game to continue.", Color::DarkGray);
            }
            Err(e) => {
                error!("could not resume: {:#}", e);
                if e.downcast_ref::<GameError>().is_some() {
                    if let Err(e) = self.resume.clear() {
                        warn!("could not clear saved progress: {}", e);
                    }
                    self.resume_available = false;
                }
                self.say("Unable to continue the saved game.", Color::Red);
            }
        }
    }

    fn handle_choice_key(&mut self, key: KeyEvent) {
        match key.code {
            // Progress stays saved, so the title screen offers CONTINUE.
            KeyCode::Esc => return self.restart(),
            KeyCode::Char('l') => return self.open_leaderboard(),
            KeyCode::Char('p') => return self.open_profile(),
            _ => {}
        }
        let count = self
            .game
            .as_ref()
            .and_then(|g| g.scenario())
            .map_or(0, |s| s.actions.len());
        if count == 0 {
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.action_cursor = (self.action_cursor + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.action_cursor = (self.action_cursor + 1) % count;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < count {
                    self.action_cursor = index;
                    self.choose();
                }
            }
            KeyCode::Enter => self.choose(),
            _ => {}
        }
    }

    fn choose(&mut self) {
        let cursor = self.action_cursor;
        let Some(game) = &mut self.game else {
            return;
        };
        let Some(action_id) = game
            .scenario()
            .and_then(|s| s.actions.get(cursor))
            .map(|a| a.id)
        else {
            return;
        };
        match game.choose_action(action_id) {
            Ok(outcome) => {
                let points = game
                    .selection()
                    .map_or(0, |s| s.action.points.max(0));
                let color = match outcome.kind {
                    OutcomeKind::Correct => Color::Green,
                    OutcomeKind::Partially => Color::Yellow,
                    OutcomeKind::Wrong => Color::Red,
                };
                self.say(
                    format!(
                        "{}  +{} points  [ Press ENTER ]\n\n{}",
                        outcome.headline, points, outcome.explanation
                    ),
                    color,
                );
                if outcome.kind != OutcomeKind::Wrong {
                    self.check_power_ups();
                }
            }
            Err(e) => self.report_game(e),
        }
    }

    fn proceed(&mut self) {
        let Some(game) = &mut self.game else {
            return;
        };
        match game.proceed() {
            Ok(signal) => {
                self.action_cursor = 0;
                self.sync_resume();
                self.describe_phase();
                if let Some(signal) = signal {
                    self.run_signal(signal);
                }
            }
            Err(e) => self.report_game(e),
        }
    }

    fn continue_to_next_level(&mut self) {
        let Some(game) = &mut self.game else {
            return;
        };
        match game.continue_to_next_level() {
            Ok(()) => self.describe_phase(),
            Err(GameError::LevelDataPending) if self.pending.is_some() => {
                self.say("The next level failed to load. Press r to retry.", Color::Red);
            }
            Err(e) => self.report_game(e),
        }
    }

    fn start_level(&mut self) {
        let Some(game) = &mut self.game else {
            return;
        };
        match game.start_level() {
            Ok(()) => {
                self.action_cursor = 0;
                self.sync_resume();
                self.describe_phase();
            }
            Err(e) => self.report_game(e),
        }
    }

    fn restart(&mut self) {
        let Some(game) = &mut self.game else {
            return;
        };
        let signal = game.restart();
        self.menu_selection = 0;
        self.run_signal(signal);
    }

    fn create_invite(&mut self) {
        let Some(token) = self.auth.current_token() else {
            self.say("Log in to invite a friend.", Color::DarkGray);
            return;
        };
        match self.api.create_invite(token) {
            Ok(invite) => {
                info!("created invite {}", invite.token);
                self.say(
                    format!("Share this invite code: {}", invite.token),
                    Color::Cyan,
                );
                self.invite_token = Some(invite.token);
            }
            Err(e) => self.report_api("an invite", e),
        }
    }

    fn open_leaderboard(&mut self) {
        match self.api.top_scores() {
            Ok(entries) => {
                self.leaderboard = entries;
                if let Some(game) = &mut self.game {
                    game.open_side_view(SideView::Leaderboard);
                }
            }
            Err(e) => self.report_api("the leaderboard", e),
        }
    }

    fn open_profile(&mut self) {
        let Some(token) = self.auth.current_token().map(str::to_string) else {
            self.form = Some(Form::new(FormKind::Login));
            return;
        };
        let loaded = self
            .api
            .current_user(&token)
            .and_then(|user| Ok((user, self.api.active_power_ups(&token)?)));
        match loaded {
            Ok((user, power_ups)) => {
                self.profile = Some(user);
                self.active_power_ups = power_ups;
                self.power_up_cursor = 0;
                if let Some(game) = &mut self.game {
                    game.open_side_view(SideView::Profile);
                }
            }
            Err(e) => self.report_api("your profile", e),
        }
    }

    fn close_side_view(&mut self) {
        if let Some(game) = &mut self.game {
            if let Err(e) = game.close_side_view() {
                self.report_game(e);
                return;
            }
        }
        self.describe_phase();
    }

    fn handle_profile_key(&mut self, key: KeyEvent) {
        let count = self.active_power_ups.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.power_up_cursor = (self.power_up_cursor + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.power_up_cursor = (self.power_up_cursor + 1) % count;
            }
            KeyCode::Char('u') => self.use_power_up(),
            KeyCode::Char('o') => {
                self.auth.logout();
                self.power_ups = PowerUpLedger::default();
                self.profile = None;
                self.close_side_view();
                self.say("Logged out.", Color::Yellow);
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close_side_view(),
            _ => {}
        }
    }

    fn use_power_up(&mut self) {
        let Some(id) = self.active_power_ups.get(self.power_up_cursor).map(|p| p.id) else {
            return;
        };
        let Some(token) = self.auth.current_token() else {
            return;
        };
        match self.api.use_power_up(id, token) {
            Ok(()) => {
                let used = self.active_power_ups.remove(self.power_up_cursor);
                self.power_up_cursor = self
                    .power_up_cursor
                    .min(self.active_power_ups.len().saturating_sub(1));
                self.say(format!("Used {}.", used.power_up.name), Color::Cyan);
            }
            Err(e) => self.report_api("that power-up", e),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = &mut self.form else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Enter => self.submit_form(),
            _ => {
                let focus = form.focus;
                form.fields[focus].input(key);
            }
        }
    }

    fn submit_form(&mut self) {
        let Some(mut form) = self.form.take() else {
            return;
        };
        let username = form.value(0);
        if username.is_empty() {
            form.error = Some("Username is required.".into());
            self.form = Some(form);
            return;
        }
        let result = match form.kind {
            FormKind::Login => self.auth.login(&Credentials {
                username: username.clone(),
                password: form.value(1),
            }),
            FormKind::Register => self.auth.register(&Registration {
                username: username.clone(),
                email: form.value(1),
                password: form.value(2),
            }),
        };
        match result {
            Ok(()) => {
                self.load_profile();
                self.say(format!("Welcome, {username}!"), Color::Green);
                if !matches!(self.screen(), Screen::Title | Screen::Loading) {
                    self.load_power_ups();
                }
                self.menu_selection = 0;
            }
            Err(e) => {
                warn!("{:?} failed: {}", form.kind, e);
                form.error = Some(match e {
                    ApiError::Unauthorized | ApiError::Status { code: 400, .. } => {
                        "Those details were not accepted.".into()
                    }
                    other => format!("Unable to reach the server: {other}"),
                });
                self.form = Some(form);
            }
        }
    }
}
