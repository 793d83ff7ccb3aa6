use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use super::{bar, truncate};
use crate::db::KeyValueStore;
use crate::models::{StudyPlan, Topic, MAX_IMPORTANCE};
use crate::reconcile::{self, PlanSummary};
use crate::tui::App;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let plan = app.store().plan();
    let summary = reconcile::summarize(plan);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress gauge
            Constraint::Length(8), // Plan + counts row
            Constraint::Min(0),    // Up next
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_gauge(f, &summary, chunks[0]);
    draw_plan(f, plan, top_chunks[0]);
    draw_counts(f, &summary, top_chunks[1]);
    draw_up_next(f, plan, chunks[2]);
}

fn draw_gauge(f: &mut Frame, summary: &PlanSummary, area: Rect) {
    let color = match summary.progress {
        0..=32 => Color::Red,
        33..=65 => Color::Yellow,
        _ => Color::Green,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Progress ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(summary.progress.min(100)))
        .label(format!(
            "{}% ({}/{} done)",
            summary.progress, summary.completed, summary.total
        ));

    f.render_widget(gauge, area);
}

fn draw_plan(f: &mut Frame, plan: &StudyPlan, area: Rect) {
    let label = Style::default().fg(Color::Gray);

    let text = vec![
        Line::from(vec![
            Span::styled("Subject: ", label),
            Span::styled(
                plan.subject.as_str(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Difficulty: ", label),
            Span::styled(plan.difficulty.label(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Created: ", label),
            Span::styled(
                plan.created_at.format("%b %d, %Y").to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Total time: ", label),
            Span::styled(
                format!("{} min", plan.total_time),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Plan ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_counts(f: &mut Frame, summary: &PlanSummary, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    let text = vec![
        Line::from(vec![
            Span::styled("Videos: ", label),
            Span::styled(summary.videos.to_string(), value),
            Span::styled(
                format!("  ({} min watch)", summary.watch_minutes),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled("Articles: ", label),
            Span::styled(summary.articles.to_string(), value),
            Span::styled(
                format!("  ({} min read)", summary.reading_minutes),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled("Questions: ", label),
            Span::styled(summary.questions.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Completed: ", label),
            Span::styled(
                summary.completed.to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Prep left: ", label),
            Span::styled(
                format!("{} min", summary.remaining_prep_minutes),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Items ")
        .title_style(Style::default().fg(Color::Magenta));

    f.render_widget(Paragraph::new(text).block(block), area);
}

/// Open topics, most important first.
fn up_next(plan: &StudyPlan, limit: usize) -> Vec<&Topic> {
    let mut open: Vec<&Topic> = plan.tabs.videos.iter().filter(|t| !t.completed).collect();
    open.sort_by(|a, b| b.importance.cmp(&a.importance));
    open.truncate(limit);
    open
}

fn draw_up_next(f: &mut Frame, plan: &StudyPlan, area: Rect) {
    let items: Vec<ListItem> = up_next(plan, area.height.saturating_sub(2) as usize)
        .into_iter()
        .enumerate()
        .map(|(i, topic)| {
            let style = if topic.importance >= 8 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<32}", truncate(&topic.topic_name, 30)), style),
                Span::styled(
                    bar(topic.importance as usize, MAX_IMPORTANCE as usize),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!(" {:>3} min", topic.prep_time_minutes),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Up Next ")
        .title_style(Style::default().fg(Color::Yellow));

    if items.is_empty() {
        let paragraph = Paragraph::new("Nothing left to watch. Add topics or generate a plan.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
    } else {
        f.render_widget(List::new(items).block(block), area);
    }
}
