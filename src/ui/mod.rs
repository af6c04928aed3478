use crate::app::App;
use crate::session::Session;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::time::Instant;

pub mod army_view;
pub mod keeper_view;
pub mod options_view;
pub mod realm_view;

pub fn render(frame: &mut Frame, app: &App, session: &Session, now: Instant) {
    let size = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    render_header(frame, layout[0], session, now);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(layout[1]);

    realm_view::render(frame, columns[0], app, session);
    keeper_view::render(frame, columns[1], session, now);
    army_view::render(frame, columns[2], app, session);

    render_footer(frame, layout[2]);

    if app.options_open {
        options_view::render(frame, app, session);
    }
}

fn render_header(frame: &mut Frame, area: Rect, session: &Session, now: Instant) {
    let idle = if session.is_idle(now) {
        "idle".to_string()
    } else {
        format!("active ({}s)", session.monitor.idle_duration(now).as_secs())
    };
    let assist = if session.options.assist.enabled {
        "on"
    } else {
        "off"
    };
    let tally = session.spell_status();

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Realmkeeper",
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  Assist: "),
            Span::styled(assist.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw("  •  Player: "),
            Span::styled(idle, Style::default().fg(Color::Cyan)),
            Span::raw("  •  Spells: "),
            Span::styled(
                format!("{}/{}", tally.active, tally.total),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  Page: "),
            Span::styled(
                session.realm.page.label(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![Span::raw(
            "The keeper only acts while you are away and resources overflow.",
        )]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let instructions = Paragraph::new(Line::from(vec![
        Span::raw("Hotkeys: "),
        Span::styled("[1-4]", Style::default().fg(Color::Yellow)),
        Span::raw(" pages  •  "),
        Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
        Span::raw(" focus  •  "),
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" build/attack  •  "),
        Span::styled("[E]", Style::default().fg(Color::Yellow)),
        Span::raw(" scout  •  "),
        Span::styled("[A]", Style::default().fg(Color::Yellow)),
        Span::raw(" assist  •  "),
        Span::styled("[G/S]", Style::default().fg(Color::Yellow)),
        Span::raw(" army run/stop  •  "),
        Span::styled("[M]", Style::default().fg(Color::Yellow)),
        Span::raw(" mode  •  "),
        Span::styled("[C/D]", Style::default().fg(Color::Yellow)),
        Span::raw(" spells  •  "),
        Span::styled("[O]", Style::default().fg(Color::Yellow)),
        Span::raw(" options  •  "),
        Span::styled("[Q]", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(instructions, area);
}
