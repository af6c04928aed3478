use crate::app::{App, FocusTarget};
use crate::keeper::army::FIGHT_BLACKLIST;
use crate::keeper::surface::{BattleOracle, FightCandidate, OracleFlags, Perception};
use crate::session::Session;
use crate::sim::realm::Realm;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Offered encounters easiest first, the order the assistant evaluates
/// them in; panel selection indices refer to this list.
pub fn sorted_encounters(realm: &Realm) -> Vec<FightCandidate> {
    let mut encounters = realm.encounters();
    encounters.sort_by(|a, b| {
        a.difficulty
            .cmp(&b.difficulty)
            .then_with(|| a.level.cmp(&b.level))
    });
    encounters
}

pub fn render(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let sections = Layout::vertical([Constraint::Length(8), Constraint::Min(3)]).split(area);
    render_status(frame, sections[0], app, session);
    render_encounters(frame, sections[1], app, session);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let block = Block::default().title("Army").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let realm = &session.realm;
    let units = realm.unit_counts();
    let assistant = if session.army.is_running() {
        format!(
            "running {} ({})",
            session.army.mode().label(),
            session.army.phase_label()
        )
    } else {
        match session.army.last_stop() {
            Some(reason) => format!("stopped: {}", reason.label()),
            None => "idle".to_string(),
        }
    };
    let missions = match (&realm.exploration, &realm.attack_mission) {
        (Some(_), Some(attack)) => format!("exploring + attacking {}", attack.encounter),
        (Some(_), None) => "exploring".to_string(),
        (None, Some(attack)) => format!("attacking {}", attack.encounter),
        (None, None) => "none".to_string(),
    };

    let lines = vec![
        Line::from(vec![Span::raw(format!(
            "Scouts {} • Explorers {} • Familiars {} (total {})",
            units.scouts,
            units.explorers,
            units.familiars,
            units.total()
        ))]),
        Line::from(vec![Span::raw(format!("Army power: {:.0}", realm.army_power))]),
        Line::from(vec![Span::raw(format!("Missions: {missions}"))]),
        Line::from(vec![
            Span::raw("Assistant: "),
            Span::styled(assistant, Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![Span::raw(format!(
            "Next run mode: {}",
            app.army_mode.label()
        ))]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_encounters(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let highlight = app.focus() == FocusTarget::Encounters;
    let border_style = if highlight {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let realm = &session.realm;
    let encounters = sorted_encounters(realm);
    let mut items: Vec<ListItem> = encounters
        .iter()
        .map(|candidate| {
            let skulls = "☠".repeat(candidate.difficulty as usize);
            let blacklisted = FIGHT_BLACKLIST.contains(&candidate.id.as_str());
            let prediction = match realm.predicts_victory(&candidate.id, OracleFlags::default()) {
                Some(true) => Span::styled("winnable", Style::default().fg(Color::LightGreen)),
                Some(false) => Span::styled("not winnable", Style::default().fg(Color::Red)),
                None => Span::styled("no prediction", Style::default().fg(Color::DarkGray)),
            };
            let name = crate::catalog::encounter(&candidate.id)
                .map(|def| def.name)
                .unwrap_or(candidate.id.as_str());
            let line = Line::from(vec![
                Span::styled(name.to_string(), Style::default().fg(Color::Yellow)),
                Span::raw(format!(" lv{} ", candidate.level)),
                Span::styled(skulls, Style::default().fg(Color::Red)),
            ]);
            let detail = Line::from(vec![
                Span::raw("  "),
                prediction,
                Span::raw(if blacklisted { "  •  never auto-fought" } else { "" }),
            ]);
            ListItem::new(vec![line, detail])
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("No encounters discovered."));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Encounters")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !encounters.is_empty() {
        state.select(Some(app.selected_encounter.min(encounters.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
