//! Rendering of the edit screen

use projdesk_core::edit::{NotificationKind, Section, ViewState, project_sections};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

const KEY_HINTS: &str =
    "↑/↓: Field | Enter: Edit | ←/→: Change | Del: Clear | Ctrl+S: Save | q: Quit";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Form
            Constraint::Length(4), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.view.state() {
        ViewState::Loading => render_loading(frame, app, chunks[1]),
        ViewState::Ready | ViewState::Submitting => render_form(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state, color) = match app.view.state() {
        ViewState::Loading => ("Загрузка...", Color::Yellow),
        ViewState::Ready => ("Готово", Color::Green),
        ViewState::Submitting => ("Сохранение...", Color::Yellow),
    };
    let dirty = if app.view.form().is_dirty() { " *" } else { "" };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Редактирование проекта #{}{}", app.view.id(), dirty),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(state, Style::default().fg(color)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Projdesk"));
    frame.render_widget(header, area);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let body = match app.view.load_error() {
        Some(error) => Paragraph::new(format!("Ошибка загрузки: {}", error))
            .style(Style::default().fg(Color::Red)),
        None => Paragraph::new("Загрузка...").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(
        body.wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    // Main column two thirds, side column one third
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .split(area);

    let [main_info, ai_data, settings, participants] = project_sections();

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);
    render_section(frame, app, &main_info, main[0]);
    render_section(frame, app, &ai_data, main[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);
    render_section(frame, app, &settings, side[0]);
    render_section(frame, app, &participants, side[1]);
}

fn render_section(frame: &mut Frame, app: &App, section: &Section, area: Rect) {
    let form = app.view.form();
    let selected = app.selected_field();
    let mut lines: Vec<Line> = Vec::new();

    for &name in section.fields {
        let Some(spec) = form.field(name) else {
            continue;
        };
        let is_selected = name == selected;

        let mut label = spec.label.to_string();
        if spec.is_required() {
            label.push_str(" *");
        }
        let label_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(label, label_style)));

        match (&app.editing, is_selected) {
            (Some(buffer), true) => {
                let mut rows = buffer.split('\n').peekable();
                while let Some(row) = rows.next() {
                    let cursor = if rows.peek().is_none() { "▏" } else { "" };
                    lines.push(Line::from(Span::styled(
                        format!("  {}{}", row, cursor),
                        Style::default().fg(Color::White).bg(Color::DarkGray),
                    )));
                }
            }
            _ => {
                let value = form.display(name);
                if value.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", spec.placeholder.unwrap_or("-")),
                        Style::default().fg(Color::DarkGray),
                    )));
                } else {
                    for row in value.lines() {
                        lines.push(Line::from(format!("  {}", row)));
                    }
                }
            }
        }

        if let Some(error) = form.error(name) {
            lines.push(Line::from(Span::styled(
                format!("  {}", error),
                Style::default().fg(Color::Red),
            )));
        } else if let Some(help) = spec.help {
            lines.push(Line::from(Span::styled(
                format!("  {}", help),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(section.title));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(status) = &app.status_line {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some((note, _)) = app.notifications.last() {
        let color = match note.kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            note.message.clone(),
            Style::default().fg(color),
        )));
    } else {
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        KEY_HINTS,
        Style::default().fg(Color::DarkGray),
    )));

    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
