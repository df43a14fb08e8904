//! Projdesk CLI - back-office editor for project records

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use projdesk_core::config::Config;
use projdesk_core::domain::{PROJECT_STATUS_LABELS, Project};
use projdesk_core::edit::ProjectEditView;
use projdesk_core::resource::{HttpProvider, MemoryProvider, Pagination, ResourceProvider};
use projdesk_core::Error;
use tracing::warn;

#[derive(Parser)]
#[command(name = "projdesk")]
#[command(author, version, about = "Back-office editor for project records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Serve records from a JSON fixtures file instead of the API
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// List project statuses and their labels
    Statuses,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show project details
    Show { id: i64 },
    /// Edit a project and save it
    Edit(EditArgs),
}

#[derive(Args)]
struct EditArgs {
    /// Project ID
    id: i64,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    requirements: Option<String>,
    /// Comma-separated technologies
    #[arg(long)]
    tech_stack: Option<String>,
    #[arg(long)]
    generated_spec: Option<String>,
    #[arg(long)]
    llm_estimation: Option<String>,
    /// Status value or label
    #[arg(long)]
    status: Option<String>,
    /// Budget; grouping spaces are allowed ("1 234 000")
    #[arg(long, allow_hyphen_values = true)]
    budget: Option<String>,
    /// Deadline as DD.MM.YYYY
    #[arg(long, conflicts_with = "clear_deadline")]
    deadline: Option<String>,
    /// Remove the deadline
    #[arg(long)]
    clear_deadline: bool,
    #[arg(long, allow_hyphen_values = true)]
    customer_id: Option<String>,
    #[arg(long, allow_hyphen_values = true, conflicts_with = "clear_assignee")]
    assignee_id: Option<String>,
    /// Remove the assignee
    #[arg(long)]
    clear_assignee: bool,
}

impl EditArgs {
    /// Field inputs in form order
    fn inputs(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("requirements", &self.requirements),
            ("tech_stack", &self.tech_stack),
            ("generated_spec", &self.generated_spec),
            ("llm_estimation", &self.llm_estimation),
            ("status", &self.status),
            ("budget", &self.budget),
            ("deadline", &self.deadline),
            ("customer_id", &self.customer_id),
            ("assignee_id", &self.assignee_id),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    fn cleared(&self) -> Vec<&'static str> {
        let mut cleared = Vec::new();
        if self.clear_deadline {
            cleared.push("deadline");
        }
        if self.clear_assignee {
            cleared.push("assignee_id");
        }
        cleared
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing on stderr so stdout stays parseable
    let default_level = if cli.quiet { "projdesk=warn" } else { "projdesk=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Projects { action } => {
            let config = Config::load()?;
            let provider = open_provider(cli.fixtures.as_deref(), &config)?;
            cmd_projects(provider.as_ref(), &config, action, cli.format, cli.quiet).await
        }
        Commands::Statuses => cmd_statuses(cli.format),
        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

fn open_provider(fixtures: Option<&Path>, config: &Config) -> anyhow::Result<Box<dyn ResourceProvider>> {
    match fixtures {
        Some(path) => {
            let provider = MemoryProvider::from_fixtures_file(path)
                .with_context(|| format!("Failed to load fixtures: {}", path.display()))?;
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(HttpProvider::from_config(&config.api)?)),
    }
}

async fn cmd_projects(
    provider: &dyn ResourceProvider,
    config: &Config,
    action: ProjectAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let resource = config.api.resource.as_str();

    match action {
        ProjectAction::List { page } => {
            let pagination = Pagination::new(page, config.ui.page_size);
            let result = provider.get_list(resource, pagination).await?;

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&result.items)?);
                return Ok(());
            }

            if result.items.is_empty() {
                if !quiet {
                    println!("No projects found.");
                }
                return Ok(());
            }
            if !quiet {
                println!("Projects (page {}, {} total):", pagination.current, result.total);
            }
            for item in result.items {
                match serde_json::from_value::<Project>(item) {
                    Ok(p) => println!(
                        "  #{} - {} [{}] {} ₽",
                        p.id,
                        p.title,
                        p.status.map(|s| s.label()).unwrap_or("-"),
                        p.budget_display()
                    ),
                    Err(e) => warn!(error = %e, "Skipping malformed record"),
                }
            }
        }
        ProjectAction::Show { id } => {
            let record = provider.get_one(resource, id).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }
            let project: Project = serde_json::from_value(record).map_err(Error::from)?;
            print_project(&project);
        }
        ProjectAction::Edit(args) => {
            let mut view = ProjectEditView::new(resource, args.id);
            view.load(provider).await?;

            for (field, input) in args.inputs() {
                view.set_input(field, input)
                    .with_context(|| format!("Invalid value for --{}", field.replace('_', "-")))?;
            }
            for field in args.cleared() {
                view.clear(field)?;
            }

            let saved = match view.save(provider).await {
                Ok(saved) => saved,
                Err(Error::Validation(errors)) => {
                    eprintln!("Project not saved:");
                    for error in errors.iter() {
                        let label = view
                            .form()
                            .field(&error.field)
                            .map(|f| f.label)
                            .unwrap_or(error.field.as_str());
                        eprintln!("  {}: {}", label, error.message);
                    }
                    anyhow::bail!("{} field(s) need attention", errors.len());
                }
                Err(e) => return Err(e.into()),
            };

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
                return Ok(());
            }
            if !quiet {
                for note in view.take_notifications() {
                    println!("{}", note.message);
                }
            }
            match serde_json::from_value::<Project>(saved) {
                Ok(project) => print_project(&project),
                Err(e) => warn!(error = %e, "Saved record could not be displayed"),
            }
        }
    }
    Ok(())
}

fn print_project(p: &Project) {
    println!("Project #{}: {}", p.id, p.title);
    println!("  Description: {}", p.description);
    if let Some(requirements) = &p.requirements {
        println!("  Requirements: {}", requirements);
    }
    let stack = p.tech_stack_items();
    if !stack.is_empty() {
        println!("  Tech stack: {}", stack.join(", "));
    }
    if let Some(status) = p.status {
        println!("  Status: {}", status.label());
    }
    if p.budget.is_some() {
        println!("  Budget: {} ₽", p.budget_display());
    }
    if p.deadline.is_some() {
        println!("  Deadline: {}", p.deadline_display());
    }
    if let Some(customer) = p.customer_id {
        println!("  Customer: {}", customer);
    }
    if let Some(assignee) = p.assignee_id {
        println!("  Assignee: {}", assignee);
    }
    if let Some(spec) = &p.generated_spec {
        println!("  Generated spec: {}", spec);
    }
    if let Some(estimation) = &p.llm_estimation {
        println!("  AI estimation: {}", estimation);
    }
}

fn cmd_statuses(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = PROJECT_STATUS_LABELS
            .iter()
            .map(|(status, label)| serde_json::json!({ "value": status.as_str(), "label": label }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for (status, label) in PROJECT_STATUS_LABELS {
        println!("{:<12} {}", status.as_str(), label);
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod main_tests;
