//! CLI tests

use clap::Parser;

use crate::{Cli, Commands, ConfigAction, OutputFormat, ProjectAction};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_cli_defaults_to_text_output() {
    let cli = parse(&["projdesk", "statuses"]);
    assert!(cli.format == OutputFormat::Text);
    assert!(!cli.quiet);
    assert!(cli.fixtures.is_none());
    assert!(matches!(cli.command, Commands::Statuses));
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = parse(&[
        "projdesk", "projects", "show", "7", "--format", "json", "--fixtures", "data.json",
    ]);
    assert!(cli.format == OutputFormat::Json);
    assert_eq!(cli.fixtures.as_deref(), Some(std::path::Path::new("data.json")));
    match cli.command {
        Commands::Projects {
            action: ProjectAction::Show { id },
        } => assert_eq!(id, 7),
        _ => panic!("expected projects show"),
    }
}

#[test]
fn test_cli_list_page_defaults_to_first() {
    let cli = parse(&["projdesk", "projects", "list"]);
    match cli.command {
        Commands::Projects {
            action: ProjectAction::List { page },
        } => assert_eq!(page, 1),
        _ => panic!("expected projects list"),
    }
}

#[test]
fn test_edit_inputs_follow_form_order() {
    let cli = parse(&[
        "projdesk",
        "projects",
        "edit",
        "3",
        "--budget",
        "1 234 000",
        "--title",
        "Portal",
        "--tech-stack",
        "Rust, Axum",
        "--clear-assignee",
    ]);
    let Commands::Projects {
        action: ProjectAction::Edit(args),
    } = cli.command
    else {
        panic!("expected projects edit");
    };

    assert_eq!(args.id, 3);
    assert_eq!(
        args.inputs(),
        vec![
            ("title", "Portal"),
            ("tech_stack", "Rust, Axum"),
            ("budget", "1 234 000"),
        ]
    );
    assert_eq!(args.cleared(), vec!["assignee_id"]);
}

#[test]
fn test_edit_accepts_negative_budget_text() {
    // Rejected later by the form, not by the argument parser
    let cli = parse(&["projdesk", "projects", "edit", "1", "--budget", "-5"]);
    let Commands::Projects {
        action: ProjectAction::Edit(args),
    } = cli.command
    else {
        panic!("expected projects edit");
    };
    assert_eq!(args.budget.as_deref(), Some("-5"));
}

#[test]
fn test_edit_deadline_conflicts_with_clear() {
    let result = Cli::try_parse_from([
        "projdesk",
        "projects",
        "edit",
        "1",
        "--deadline",
        "01.02.2025",
        "--clear-deadline",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_config_set_parses_key_and_value() {
    let cli = parse(&["projdesk", "config", "set", "ui.page_size", "50"]);
    match cli.command {
        Commands::Config {
            action: ConfigAction::Set { key, value },
        } => {
            assert_eq!(key, "ui.page_size");
            assert_eq!(value, "50");
        }
        _ => panic!("expected config set"),
    }
}

#[test]
fn test_unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["projdesk", "--format", "yaml", "statuses"]).is_err());
}
