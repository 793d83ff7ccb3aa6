use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{bar, truncate};
use crate::db::KeyValueStore;
use crate::models::{parse_duration, Item, ItemBody, PlanEntry, Topic, MAX_IMPORTANCE};
use crate::tui::App;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(entry) = app.detail_entry() else {
        let block = Block::default().borders(Borders::ALL).title(" Detail ");
        let paragraph = Paragraph::new("Item no longer exists").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    match entry {
        PlanEntry::Topic(topic) => draw_topic(f, topic, area),
        PlanEntry::Item(item) => draw_item(f, item, app.show_answer, area),
    }
}

fn status_line(completed: bool) -> Line<'static> {
    if completed {
        Line::from(Span::styled("Done", Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled("Not done", Style::default().fg(Color::Yellow)))
    }
}

fn title_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
}

fn draw_topic(f: &mut Frame, topic: &Topic, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header info
            Constraint::Min(0),    // Videos
        ])
        .split(area);

    let label = Style::default().fg(Color::Gray);
    let text = vec![
        status_line(topic.completed),
        Line::from(vec![
            Span::styled("Importance: ", label),
            Span::styled(
                bar(topic.importance as usize, MAX_IMPORTANCE as usize),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!(" {}/{}", topic.importance, MAX_IMPORTANCE),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::styled("Prep time: ", label),
            Span::styled(
                format!("{} min", topic.prep_time_minutes),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            Span::styled("Watch time: ", label),
            Span::styled(
                format!("{} min", topic.watch_minutes()),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(title_block(&topic.topic_name));
    f.render_widget(paragraph, chunks[0]);

    let items: Vec<ListItem> = topic
        .videos
        .iter()
        .map(|video| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<46}", truncate(&video.title, 44)),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>4} min  ", parse_duration(&video.duration)),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(
                        truncate(&video.channel, 24),
                        Style::default().fg(Color::Magenta),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", video.url),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Videos ({}) ", topic.videos.len()))
        .title_style(Style::default().fg(Color::Magenta));

    if items.is_empty() {
        let paragraph = Paragraph::new("No videos linked to this topic.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, chunks[1]);
    } else {
        f.render_widget(List::new(items).block(block), chunks[1]);
    }
}

fn draw_item(f: &mut Frame, item: &Item, show_answer: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut header = vec![status_line(item.completed)];
    if let ItemBody::Articles {
        read_time_minutes, ..
    } = item.body
    {
        header.push(Line::from(vec![
            Span::styled("Read time: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} min", read_time_minutes),
                Style::default().fg(Color::Cyan),
            ),
        ]));
    }
    f.render_widget(
        Paragraph::new(header).block(title_block(&item.title)),
        chunks[0],
    );

    let (title, body) = match &item.body {
        ItemBody::Articles { content, .. } => (" Content ", body_lines(content)),
        ItemBody::Questions { question, answer } => {
            let mut lines = vec![Line::from(Span::styled(
                question.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ))];
            lines.push(Line::from(""));
            if show_answer {
                lines.push(Line::from(Span::styled(
                    "Answer",
                    Style::default().fg(Color::Green),
                )));
                lines.extend(body_lines(answer));
            } else {
                lines.push(Line::from(Span::styled(
                    "Press a to reveal the answer",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            (" Question ", lines)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, chunks[1]);
}

fn body_lines(text: &str) -> Vec<Line<'static>> {
    if text.trim().is_empty() {
        return vec![Line::from(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    text.lines().map(|l| Line::from(l.to_string())).collect()
}
