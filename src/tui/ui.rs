use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{item_detail, items, overview};
use super::{App, View};
use crate::db::KeyValueStore;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let tab_titles: Vec<String> = View::TABS
        .iter()
        .map(|view| match app.list(*view) {
            Some(list) => format!("{} ({})", tab_title(*view), list.items.len()),
            None => tab_title(*view).to_string(),
        })
        .collect();

    let selected = match app.view {
        View::Detail => app.detail_return.index(),
        view => view.index(),
    };

    let title = format!(" Rapid Revise: {} ", app.store().plan().subject);
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn tab_title(view: View) -> &'static str {
    match view {
        View::Overview => "Overview",
        View::Videos => "Videos",
        View::Articles => "Articles",
        View::Questions => "Questions",
        View::Completed => "Completed",
        View::Detail => "Detail",
    }
}

fn draw_content<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    match app.view {
        View::Overview => overview::draw(f, app, area),
        View::Detail => item_detail::draw(f, app, area),
        view => items::draw(f, app, view, tab_title(view), area),
    }
}

fn key(k: &str) -> Span<'_> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let help_text = if app.filter_mode {
        vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(&app.filter_input),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            key("<CR>"),
            Span::raw(" Apply  "),
            key("<Esc>"),
            Span::raw(" Cancel"),
        ]
    } else if let Some(status) = &app.status {
        vec![Span::styled(
            status.as_str(),
            Style::default().fg(Color::Green),
        )]
    } else {
        let mut spans = Vec::new();

        match app.view {
            View::Overview => {
                spans.extend(vec![
                    key("h/l"),
                    Span::raw(" Tabs  "),
                    key("1-5"),
                    Span::raw(" Jump  "),
                    key("^r"),
                    Span::raw(" Reload  "),
                ]);
            }
            View::Detail => {
                spans.extend(vec![
                    key("h/<Esc>"),
                    Span::raw(" Back  "),
                    key("x"),
                    Span::raw(" Done  "),
                    key("d"),
                    Span::raw(" Delete  "),
                ]);
                if app
                    .detail_entry()
                    .is_some_and(|e| e.item_type() == crate::models::ItemType::Questions)
                {
                    spans.extend(vec![key("a"), Span::raw(" Answer  ")]);
                }
            }
            _ => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("g/G"),
                    Span::raw(" Top/Bot  "),
                    key("l/<CR>"),
                    Span::raw(" Open  "),
                    key("x"),
                    Span::raw(" Done  "),
                    key("d"),
                    Span::raw(" Delete  "),
                    key("/"),
                    Span::raw(" Filter  "),
                ]);
                if app.filter.is_some() {
                    spans.extend(vec![key("<Esc>"), Span::raw(" Clear  ")]);
                }
            }
        }

        spans.extend(vec![key("q"), Span::raw(" Quit")]);
        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
