use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{bar, truncate};
use crate::db::KeyValueStore;
use crate::models::{ItemBody, PlanEntry, MAX_IMPORTANCE};
use crate::tui::{App, View};

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>, view: View, name: &str, area: Rect) {
    let title = match &app.filter {
        Some(filter) => format!(" {} (filter: {}) ", name, filter),
        None => format!(" {} ", name),
    };

    let entries = app.entries_for(view);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    if entries.is_empty() {
        let hint = match view {
            View::Completed => "Nothing completed yet. Press x on an item to mark it done.",
            _ if app.filter.is_some() => "No items match the filter.",
            _ => "No items yet. Add some with `rapid-revise item add`.",
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = entries.iter().map(|e| row(*e, view)).collect();

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled("    ", header_style),
        Span::styled(format!("{:<40}", "Title"), header_style),
        Span::styled(detail_header(view), header_style),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.list(view).and_then(|l| l.selected));

    // Header sits on the first row inside the border
    let header_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };

    f.render_stateful_widget(list, list_area, &mut state);
}

fn detail_header(view: View) -> &'static str {
    match view {
        View::Videos => "Importance  Prep",
        View::Articles => "Read",
        View::Completed => "Type",
        _ => "",
    }
}

fn row(entry: PlanEntry<'_>, view: View) -> ListItem<'static> {
    let (mark, mark_color) = if entry.completed() {
        ("[x] ", Color::Green)
    } else {
        ("[ ] ", Color::DarkGray)
    };

    let title_style = if entry.completed() {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(mark, Style::default().fg(mark_color)),
        Span::styled(format!("{:<40}", truncate(entry.title(), 38)), title_style),
    ];

    match (view, entry) {
        (View::Completed, _) => {
            spans.push(Span::styled(
                entry.item_type().label(),
                Style::default().fg(Color::Cyan),
            ));
        }
        (_, PlanEntry::Topic(topic)) => {
            spans.push(Span::styled(
                bar(topic.importance as usize, MAX_IMPORTANCE as usize),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::styled(
                format!(" {:>2}  {:>3} min", topic.importance, topic.prep_time_minutes),
                Style::default().fg(Color::Yellow),
            ));
        }
        (_, PlanEntry::Item(item)) => {
            if let ItemBody::Articles {
                read_time_minutes, ..
            } = item.body
            {
                spans.push(Span::styled(
                    format!("{} min", read_time_minutes),
                    Style::default().fg(Color::Cyan),
                ));
            }
        }
    }

    ListItem::new(Line::from(spans))
}
