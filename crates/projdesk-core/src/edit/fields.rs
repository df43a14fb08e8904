//! Project form declarations and card layout

use crate::domain::status_options;
use crate::form::FieldSpec;

/// Step of the budget field
pub const BUDGET_STEP: f64 = 1000.0;

/// A titled group of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [&'static str],
}

/// Field declarations of the project edit form
pub fn project_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::input("title", "Название")
            .placeholder("Название проекта")
            .required("Введите название"),
        FieldSpec::textarea("description", "Описание", 4)
            .placeholder("Подробное описание проекта...")
            .required("Введите описание"),
        FieldSpec::textarea("requirements", "Требования", 6)
            .placeholder("Технические требования, функциональность..."),
        FieldSpec::input("tech_stack", "Технический стек")
            .placeholder("Python, FastAPI, PostgreSQL, React")
            .help("Введите технологии через запятую"),
        FieldSpec::textarea("generated_spec", "Сгенерированное ТЗ", 6)
            .placeholder("Сгенерированное техническое задание..."),
        FieldSpec::textarea("llm_estimation", "AI Оценка времени", 4)
            .placeholder("Оценка времени от LLM..."),
        FieldSpec::select("status", "Статус", status_options()).required("Выберите статус"),
        FieldSpec::number("budget", "Бюджет (₽)", 0.0)
            .step(BUDGET_STEP)
            .grouped()
            .required("Введите бюджет"),
        FieldSpec::date("deadline", "Дедлайн"),
        FieldSpec::number("customer_id", "ID Заказчика", 1.0)
            .integer()
            .required("Укажите заказчика"),
        FieldSpec::number("assignee_id", "ID Исполнителя", 1.0).integer(),
    ]
}

/// Card layout of the edit view, main column first
pub fn project_sections() -> [Section; 4] {
    [
        Section {
            title: "📝 Основные данные",
            fields: &["title", "description", "requirements", "tech_stack"],
        },
        Section {
            title: "🤖 AI данные",
            fields: &["generated_spec", "llm_estimation"],
        },
        Section {
            title: "⚙️ Настройки",
            fields: &["status", "budget", "deadline"],
        },
        Section {
            title: "👥 Участники",
            fields: &["customer_id", "assignee_id"],
        },
    ]
}
