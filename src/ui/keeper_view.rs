use crate::keeper::assist::{BuildOutcome, MagicKind, MagicOutcome, TickOutcome};
use crate::log::MsgLevel;
use crate::session::Session;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use std::time::Instant;

fn active_spell_names(session: &Session) -> String {
    let names: Vec<&str> = crate::catalog::SPELLS
        .iter()
        .filter(|def| session.realm.active_spells.contains(def.id))
        .map(|def| def.name)
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn describe_outcome(outcome: &TickOutcome) -> String {
    match outcome {
        TickOutcome::Disabled => "assist disabled".to_string(),
        TickOutcome::UserActive => "waiting for you to go idle".to_string(),
        TickOutcome::NothingAtCap => "no resource near capacity".to_string(),
        TickOutcome::Ran { magic, build, .. } => {
            let mut parts = Vec::new();
            match magic {
                MagicOutcome::Performed { kind, id } => parts.push(format!(
                    "{} {id}",
                    match kind {
                        MagicKind::Research => "researched",
                        MagicKind::Prayer => "prayed",
                    }
                )),
                MagicOutcome::NothingEligible => parts.push("no safe magic".to_string()),
                MagicOutcome::Failed(_) => parts.push("magic failed".to_string()),
                MagicOutcome::NotDue => {}
            }
            match build {
                BuildOutcome::Built { id, .. } => parts.push(format!("built {id}")),
                BuildOutcome::NoSafeOption { subpage } => {
                    parts.push(format!("no safe building ({})", subpage.label()))
                }
                BuildOutcome::Failed(_) => parts.push("build failed".to_string()),
                BuildOutcome::NoConsumer | BuildOutcome::NotDue => {}
            }
            if parts.is_empty() {
                "nothing to do".to_string()
            } else {
                parts.join(", ")
            }
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, session: &Session, now: Instant) {
    let sections = Layout::vertical([Constraint::Length(11), Constraint::Min(3)]).split(area);

    let block = Block::default().title("Keeper").borders(Borders::ALL);
    let inner = block.inner(sections[0]);
    frame.render_widget(block, sections[0]);

    let options = &session.options.assist;
    let idle_secs = session.monitor.idle_duration(now).as_secs();
    let capped: Vec<String> = session
        .resources_at_cap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    let features = [
        ("buildings", options.buildings),
        ("research", options.research),
        ("prayers", options.prayers),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>()
    .join(", ");
    let last = session
        .last_outcome
        .as_ref()
        .map(describe_outcome)
        .unwrap_or_else(|| "nothing yet".to_string());

    let lines = vec![
        Line::from(vec![
            Span::raw("Assist mode: "),
            Span::styled(
                if options.enabled { "enabled" } else { "disabled" },
                Style::default().fg(if options.enabled {
                    Color::LightGreen
                } else {
                    Color::Red
                }),
            ),
        ]),
        Line::from(vec![Span::raw(if session.monitor.has_input_signal() {
            format!("Idle {idle_secs}s of {}s required", options.idle_seconds)
        } else {
            "No input signal observed yet".to_string()
        })]),
        Line::from(vec![Span::raw(format!(
            "Features: {}",
            if features.is_empty() {
                "none"
            } else {
                features.as_str()
            }
        ))]),
        Line::from(vec![
            Span::raw("At cap: "),
            Span::styled(
                if capped.is_empty() {
                    "nothing".to_string()
                } else {
                    capped.join(", ")
                },
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(vec![Span::raw(format!("Last tick: {last}"))]),
        Line::from(vec![Span::raw(format!(
            "Subpages that came up empty: {}",
            {
                let skipped: Vec<&str> = session
                    .assist
                    .failed_subpages()
                    .map(|subpage| subpage.label())
                    .collect();
                if skipped.is_empty() {
                    "none".to_string()
                } else {
                    skipped.join(", ")
                }
            }
        ))]),
        Line::from(vec![Span::raw(format!(
            "Pending synthetic clicks: {}",
            session.monitor.pending_clicks()
        ))]),
        Line::from(vec![Span::raw(format!(
            "Active spells: {}",
            active_spell_names(session)
        ))]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    let log_block = Block::default()
        .title(format!("Event Log ({})", session.log.iter().count()))
        .borders(Borders::ALL);
    let log_area = log_block.inner(sections[1]);
    frame.render_widget(log_block, sections[1]);

    let visible = log_area.height as usize;
    let mut items: Vec<ListItem> = session
        .log
        .recent(visible)
        .map(|message| {
            let style = match message.level {
                MsgLevel::Debug => Style::default().fg(Color::DarkGray),
                MsgLevel::Info => Style::default(),
                MsgLevel::Warn => Style::default().fg(Color::Yellow),
                MsgLevel::Error => Style::default().fg(Color::Red),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", message.level.tag()), style),
                Span::styled(message.text.clone(), style),
            ]))
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("Quiet so far."));
    }
    frame.render_widget(List::new(items), log_area);
}
