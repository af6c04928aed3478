mod app;
mod catalog;
mod keeper;
mod log;
mod persist;
mod session;
mod sim;
mod ui;

use anyhow::Result;
use app::{App, FocusTarget};
use catalog::{BuildSubpage, Page};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use persist::{load_options, save_options, Options};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use session::{AssistFeature, Session};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task;
use ui::{army_view, realm_view};

#[tokio::main]
async fn main() -> Result<()> {
    let options = load_options()?.unwrap_or_else(Options::default);
    let mut session = Session::new(options, Instant::now());
    session.log.info("keeper ready, watching for overflow");

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut session).await;
    restore_terminal(&mut terminal)?;

    save_options(&session.options)?;
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
) -> Result<()> {
    let mut app = App::new();

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    task::spawn(async move {
        loop {
            match task::spawn_blocking(crossterm::event::read).await {
                Ok(Ok(event)) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(Err(_)) => break,
                Err(_) => break,
            }
        }
    });

    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);
    let mut should_quit = false;

    loop {
        let now = Instant::now();
        terminal.draw(|f| ui::render(f, &app, session, now))?;
        if should_quit {
            break;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        tokio::select! {
            Some(event) = input_rx.recv() => {
                if handle_event(event, &mut app, session)? {
                    should_quit = true;
                }
            }
            _ = tokio::time::sleep(timeout) => {
                let delta = last_tick.elapsed();
                last_tick = Instant::now();
                session.update(delta, last_tick);
                clamp_selections(&mut app, session);
                if session.take_options_dirty() {
                    if let Err(err) = save_options(&session.options) {
                        session.log.error(format!("could not save options: {err}"));
                    }
                }
            }
        }
    }

    Ok(())
}

fn clamp_selections(app: &mut App, session: &Session) {
    app.clamp_building_selection(realm_view::subpage_buildings(&session.realm).len());
    app.clamp_encounter_selection(army_view::sorted_encounters(&session.realm).len());
}

fn handle_event(event: Event, app: &mut App, session: &mut Session) -> Result<bool> {
    let now = Instant::now();
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            session.note_user_key(now);
            handle_key_event(key, app, session, now)
        }
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(_),
            column,
            row,
            ..
        }) => {
            session.note_user_click(column, row, now);
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    session: &mut Session,
    now: Instant,
) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    if app.options_open {
        return handle_options_key(key, app, session);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Ok(true),
        KeyCode::Tab | KeyCode::BackTab => {
            app.next_focus();
            Ok(false)
        }
        KeyCode::Char('1') => {
            session.user_open_page(Page::Build);
            Ok(false)
        }
        KeyCode::Char('2') => {
            session.user_open_page(Page::Research);
            Ok(false)
        }
        KeyCode::Char('3') => {
            session.user_open_page(Page::Magic);
            Ok(false)
        }
        KeyCode::Char('4') => {
            session.user_open_page(Page::Army);
            Ok(false)
        }
        KeyCode::Char('[') => {
            session.user_open_build_subpage(BuildSubpage::City);
            Ok(false)
        }
        KeyCode::Char(']') => {
            session.user_open_build_subpage(BuildSubpage::Outskirts);
            Ok(false)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            move_selection(app, session, -1);
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            move_selection(app, session, 1);
            Ok(false)
        }
        KeyCode::Enter => {
            handle_enter(app, session);
            Ok(false)
        }
        KeyCode::Char('e') | KeyCode::Char('E') => {
            session.user_send_scouts();
            Ok(false)
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            session.toggle_assist();
            Ok(false)
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            session.auto_scout_and_fight(app.army_mode);
            Ok(false)
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            session.stop_army_assistant();
            Ok(false)
        }
        KeyCode::Char('m') | KeyCode::Char('M') => {
            app.cycle_army_mode();
            Ok(false)
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            session.cast_all_spells(now);
            Ok(false)
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            session.dismiss_all_spells(now);
            Ok(false)
        }
        KeyCode::Char('o') | KeyCode::Char('O') => {
            app.toggle_options();
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_options_key(key: KeyEvent, app: &mut App, session: &mut Session) -> Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('O') => {
            app.toggle_options();
            Ok(false)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            app.move_option_selection(-1);
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            app.move_option_selection(1);
            Ok(false)
        }
        KeyCode::Left => {
            if app.selected_option == 4 {
                session.adjust_idle_seconds(-10);
            }
            Ok(false)
        }
        KeyCode::Right => {
            if app.selected_option == 4 {
                session.adjust_idle_seconds(10);
            }
            Ok(false)
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            match app.selected_option {
                0 => session.toggle_assist(),
                1 => session.toggle_feature(AssistFeature::Buildings),
                2 => session.toggle_feature(AssistFeature::Research),
                3 => session.toggle_feature(AssistFeature::Prayers),
                5 => session.toggle_idle_without_signal(),
                _ => {}
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_enter(app: &mut App, session: &mut Session) {
    match app.focus() {
        FocusTarget::Buildings => {
            let buildings = realm_view::subpage_buildings(&session.realm);
            if buildings.is_empty() {
                session.log.info("nothing to build on this subpage");
                return;
            }
            let index = app.selected_building.min(buildings.len() - 1);
            let id = buildings[index].id;
            session.user_build(id);
        }
        FocusTarget::Encounters => {
            let encounters = army_view::sorted_encounters(&session.realm);
            if encounters.is_empty() {
                session.log.info("no encounters discovered yet");
                return;
            }
            let index = app.selected_encounter.min(encounters.len() - 1);
            let id = encounters[index].id.clone();
            session.user_attack(&id);
        }
    }
}

fn move_selection(app: &mut App, session: &Session, delta: isize) {
    match app.focus() {
        FocusTarget::Buildings => {
            let len = realm_view::subpage_buildings(&session.realm).len();
            if len > 0 {
                let mut idx = app.selected_building as isize + delta;
                if idx < 0 {
                    idx = len as isize - 1;
                } else if idx >= len as isize {
                    idx = 0;
                }
                app.selected_building = idx as usize;
            }
        }
        FocusTarget::Encounters => {
            let len = army_view::sorted_encounters(&session.realm).len();
            if len > 0 {
                let mut idx = app.selected_encounter as isize + delta;
                if idx < 0 {
                    idx = len as isize - 1;
                } else if idx >= len as isize {
                    idx = 0;
                }
                app.selected_encounter = idx as usize;
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
