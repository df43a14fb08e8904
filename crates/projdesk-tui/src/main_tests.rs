//! TUI tests
//!
//! Tests for the edit screen state and its rendering.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use projdesk_core::edit::{ProjectEditView, ViewState};
use serde_json::json;

use crate::app::{App, AppCommand, AppMessage};

fn record() -> serde_json::Value {
    json!({
        "id": 1,
        "title": "Corporate site",
        "description": "Marketing site",
        "tech_stack": "Django, PostgreSQL",
        "status": "new",
        "budget": 1234000,
        "deadline": "2025-03-15T10:00:00Z",
        "customer_id": 5,
        "assignee_id": null
    })
}

fn loaded_app() -> App {
    let mut app = App::new(ProjectEditView::new("projects", 1));
    let ticket = app.view.begin_load();
    app.handle_message(AppMessage::Loaded(ticket, Ok(record())));
    app
}

fn press(app: &mut App, code: KeyCode) -> AppCommand {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn select(app: &mut App, field: &str) {
    app.selected = app.order.iter().position(|f| *f == field).unwrap();
}

/// Test App state management
mod app_state_tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut app = loaded_app();
        assert_eq!(app.selected_field(), "title");

        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_field(), "assignee_id");

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected_field(), "description");
    }

    #[test]
    fn test_order_follows_sections() {
        let app = loaded_app();
        assert_eq!(app.order.len(), 11);
        assert_eq!(app.order[4], "generated_spec");
        assert_eq!(app.order[6], "status");
    }

    #[test]
    fn test_edit_and_commit_text() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editing.as_deref(), Some("Corporate site"));

        for _ in 0.."site".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "portal");
        press(&mut app, KeyCode::Enter);

        assert!(app.editing.is_none());
        assert_eq!(app.view.form().display("title"), "Corporate portal");
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, " v2");
        press(&mut app, KeyCode::Esc);

        assert!(app.editing.is_none());
        assert_eq!(app.view.form().display("title"), "Corporate site");
    }

    #[test]
    fn test_bad_date_keeps_buffer_open() {
        let mut app = loaded_app();
        select(&mut app, "deadline");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editing.as_deref(), Some("15.03.2025"));

        app.editing = Some("2025-03-20".to_string());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.editing.as_deref(), Some("2025-03-20"));
        assert!(app.status_line.is_some());
        assert_eq!(app.view.form().display("deadline"), "15.03.2025");
    }

    #[test]
    fn test_budget_steps_by_thousand() {
        let mut app = loaded_app();
        select(&mut app, "budget");
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.form().display("budget"), "1 235 000");

        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.view.form().display("budget"), "1 233 000");
    }

    #[test]
    fn test_status_cycles_through_labels() {
        let mut app = loaded_app();
        select(&mut app, "status");
        press(&mut app, KeyCode::Enter);
        assert!(app.editing.is_none());
        assert_eq!(app.view.form().display("status"), "В работе");

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.view.form().display("status"), "Отменён");
    }

    #[test]
    fn test_cleared_required_field_blocks_save() {
        let mut app = loaded_app();
        select(&mut app, "customer_id");
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.view.form().error("customer_id"), Some("Укажите заказчика"));

        select(&mut app, "title");
        let command = app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert_eq!(command, AppCommand::None);
        assert_eq!(app.selected_field(), "customer_id");
        assert_eq!(app.view.state(), ViewState::Ready);
    }

    #[test]
    fn test_save_builds_request_with_all_fields() {
        let mut app = loaded_app();
        let command = app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        let AppCommand::Save(request) = command else {
            panic!("expected a save request");
        };
        assert_eq!(request.id, 1);
        assert_eq!(request.payload["budget"], json!(1234000));
        assert_eq!(request.payload["deadline"], json!("2025-03-15"));
        assert_eq!(app.view.state(), ViewState::Submitting);

        // Second save while pending is ignored
        let again = app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(again, AppCommand::None);
    }

    #[test]
    fn test_save_result_becomes_notification() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        app.handle_message(AppMessage::Saved(Ok(record())));

        assert_eq!(app.view.state(), ViewState::Ready);
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].0.message, "Проект успешно сохранён");
    }

    #[test]
    fn test_notifications_expire() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        app.handle_message(AppMessage::Saved(Err(projdesk_core::Error::Rejected(
            "budget too large".to_string(),
        ))));
        assert_eq!(app.notifications.len(), 1);

        let later = std::time::Instant::now() + std::time::Duration::from_secs(10);
        app.expire_notifications(later, std::time::Duration::from_secs(5));
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_keys_inert_while_loading() {
        let mut app = App::new(ProjectEditView::new("projects", 1));
        press(&mut app, KeyCode::Enter);
        assert!(app.editing.is_none());

        select(&mut app, "budget");
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.form().display("budget"), "");
        assert!(app.status_line.is_none());
    }

    #[test]
    fn test_quit_unmounts_view() {
        let mut app = loaded_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), AppCommand::Quit);
        assert!(!app.view.is_mounted());
    }

    #[test]
    fn test_quit_refused_while_saving() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.view.state(), ViewState::Submitting);

        assert_eq!(press(&mut app, KeyCode::Char('q')), AppCommand::None);
        assert_eq!(press(&mut app, KeyCode::Esc), AppCommand::None);
        assert!(app.view.is_mounted());
        assert!(app.status_line.is_some());

        // The save result still reaches the view
        app.handle_message(AppMessage::Saved(Ok(record())));
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(press(&mut app, KeyCode::Char('q')), AppCommand::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_saving() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        let command = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(command, AppCommand::Quit);
        assert!(!app.view.is_mounted());
    }

    #[test]
    fn test_q_is_typed_while_editing() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Char('q')), AppCommand::None);
        assert_eq!(app.editing.as_deref(), Some("Corporate siteq"));
    }
}

/// Rendering tests using the ratatui test backend
mod render_tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 48)).unwrap();
        terminal.draw(|frame| crate::ui::render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_loaded_record() {
        let app = loaded_app();
        let screen = render(&app);

        assert!(screen.contains("Редактирование проекта #1"));
        assert!(screen.contains("Бюджет"));
        assert!(screen.contains("1 234 000"));
        assert!(screen.contains("15.03.2025"));
        assert!(screen.contains("Новый"));
    }

    #[test]
    fn test_renders_loading_state() {
        let mut app = App::new(ProjectEditView::new("projects", 1));
        app.view.begin_load();
        let screen = render(&app);

        assert!(screen.contains("Загрузка..."));
        assert!(!screen.contains("Бюджет"));
    }

    #[test]
    fn test_renders_load_error() {
        let mut app = App::new(ProjectEditView::new("projects", 9));
        let ticket = app.view.begin_load();
        app.handle_message(AppMessage::Loaded(
            ticket,
            Err(projdesk_core::Error::RecordNotFound {
                resource: "projects".to_string(),
                id: 9,
            }),
        ));
        let screen = render(&app);

        assert!(screen.contains("Ошибка загрузки"));
    }

    #[test]
    fn test_renders_field_error() {
        let mut app = loaded_app();
        select(&mut app, "title");
        press(&mut app, KeyCode::Delete);
        let screen = render(&app);

        assert!(screen.contains("Введите название"));
        assert!(screen.contains("Название проекта"));
    }
}
