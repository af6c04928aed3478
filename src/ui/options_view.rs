use crate::app::App;
use crate::session::Session;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn mark(on: bool) -> &'static str {
    if on { "[x]" } else { "[ ]" }
}

pub fn render(frame: &mut Frame, app: &App, session: &Session) {
    let area = centered(frame.size(), 56, 14);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Assist Options")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(inner);

    let intro = Paragraph::new(
        "The keeper aids your play, it does not replace it: statues, shrines \
         and dangerous research stay yours to decide.",
    )
    .wrap(Wrap { trim: true })
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(intro, sections[0]);

    let options = &session.options;
    let rows = [
        format!("{} Assist mode enabled", mark(options.assist.enabled)),
        format!("{} Assist with buildings", mark(options.assist.buildings)),
        format!("{} Assist with research", mark(options.assist.research)),
        format!("{} Assist with prayers", mark(options.assist.prayers)),
        format!(
            "    Idle threshold: {}s  (←/→ adjusts)",
            options.assist.idle_seconds
        ),
        format!(
            "{} Allow idling without input signal",
            mark(options.act_without_input_signal)
        ),
    ];
    let items: Vec<ListItem> = rows.iter().map(|row| ListItem::new(row.clone())).collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(app.selected_option));
    frame.render_stateful_widget(list, sections[1], &mut state);
}
