use crate::app::{App, FocusTarget};
use crate::catalog::{self, BuildingDef};
use crate::keeper::safety;
use crate::keeper::surface::Perception;
use crate::session::Session;
use crate::sim::realm::Realm;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Buildings rendered on the realm's current build subpage, in catalog
/// order; selection indices in the panel refer to this list.
pub fn subpage_buildings(realm: &Realm) -> Vec<&'static BuildingDef> {
    catalog::BUILDINGS
        .iter()
        .filter(|def| def.subpage == realm.build_subpage)
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let sections = Layout::vertical([Constraint::Length(12), Constraint::Min(3)]).split(area);
    render_resources(frame, sections[0], session);
    render_buildings(frame, sections[1], app, session);
}

fn render_resources(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default().title("Resources").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let realm = &session.realm;
    let mut lines = Vec::new();
    for resource in &realm.resources {
        if resource.capacity <= 0.0 && resource.amount <= 0.0 {
            continue;
        }
        let rate = realm.net_production(&resource.id);
        let fill = if resource.capacity > 0.0 {
            resource.amount / resource.capacity
        } else {
            0.0
        };
        let color = if fill >= 0.9 {
            Color::Red
        } else if fill >= 0.75 {
            Color::Yellow
        } else {
            Color::White
        };
        let capacity = if resource.capacity > 0.0 {
            format!("/{:.0}", resource.capacity)
        } else {
            String::new()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<10}", resource.id),
                Style::default().fg(Color::LightGreen),
            ),
            Span::styled(format!("{:>7.0}{capacity}", resource.amount), Style::default().fg(color)),
            Span::raw(format!("  {rate:+.2}/s")),
        ]));
    }
    lines.push(Line::from(vec![Span::raw(format!(
        "Structures built: {}",
        realm.total_built()
    ))]));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_buildings(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let highlight = app.focus() == FocusTarget::Buildings;
    let border_style = if highlight {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let realm = &session.realm;
    let buildings = subpage_buildings(realm);
    let offered = realm.buildable(realm.build_subpage);

    let mut items: Vec<ListItem> = buildings
        .iter()
        .map(|def| {
            let affordable = offered.iter().any(|id| id == def.id);
            let keeper_safe =
                safety::is_safe_to_auto_build(def, |resource| realm.net_production(resource));
            let count = realm.built.get(def.id).copied().unwrap_or(0);
            let name_style = if affordable {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let costs: Vec<String> = def
                .req
                .iter()
                .map(|cost| format!("{:.0} {}", cost.amount, cost.resource))
                .collect();
            let line = Line::from(vec![
                Span::styled(def.name.to_string(), name_style),
                Span::raw(format!(" x{count}")),
                Span::raw(if keeper_safe { "" } else { "  [manual]" }),
            ]);
            let detail = Line::from(vec![Span::raw(format!("  {}", costs.join(", ")))]);
            ListItem::new(vec![line, detail])
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("Nothing to build here."));
    }

    let title = format!("Build • {}", realm.build_subpage.label());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !buildings.is_empty() {
        state.select(Some(app.selected_building.min(buildings.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
