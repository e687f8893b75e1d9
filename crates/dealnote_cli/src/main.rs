//! DealNote CLI entry point.
//!
//! # Responsibility
//! - Materialize configuration from flags, environment and `.env`.
//! - Drive the core ingest and schedule services from the terminal.
//! - Own the interactive decision prompt for missing dependencies.

use clap::{Parser, Subcommand};
use console::{style, Term};
use dealnote_core::db::open_db;
use dealnote_core::{
    default_log_level, init_logging, split_inline_tags, DecisionProvider, DeliverableRepository,
    ExtractedEntry, Extractor, IngestService, RecordEntryRequest, RecordOutcome, ScheduleService,
    SqliteDeliverableRepository, SqliteJournalRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod batch;
mod openai;

use openai::{OpenAiConfig, OpenAiExtractor};

#[derive(Parser, Debug)]
#[command(name = "dealnote", version)]
#[command(about = "Journal deal notes and view dependency-aware schedules")]
struct Cli {
    /// SQLite database file. Parent directories are created when missing.
    #[arg(long, env = "DEALNOTE_DB", default_value = "./data/dealnote.db")]
    db: PathBuf,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "DEALNOTE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "DEALNOTE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log one free-text note or a batch file of notes
    Log {
        /// Free text describing one journal entry.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Batch file in `Project <Name> [<Type>]: Entry #tags` format.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Chat model used for extraction.
        #[arg(long, env = "DEALNOTE_PARSE_MODEL", default_value = "gpt-4o")]
        model: String,

        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Endpoint root for OpenAI-compatible gateways.
        #[arg(
            long,
            env = "DEALNOTE_OPENAI_BASE_URL",
            default_value = "https://api.openai.com"
        )]
        base_url: String,

        /// Create missing dependencies without prompting.
        #[arg(long, conflicts_with = "skip_missing")]
        create_missing: bool,

        /// Leave missing dependencies unlinked without prompting.
        #[arg(long)]
        skip_missing: bool,
    },
    /// Show the dependency-aware schedule for one project or all
    Schedule {
        /// Project name; omit to list every project.
        project: Option<String>,
    },
    /// List projects that have deliverables
    Projects,
}

/// Missing-dependency policy selected by flags; interactive by default.
enum DecisionMode {
    Interactive,
    Approve,
    Decline,
}

impl DecisionProvider for DecisionMode {
    fn confirm(&self, prompt: &str) -> bool {
        match self {
            Self::Approve => true,
            Self::Decline => false,
            Self::Interactive => prompt_yes_no(prompt),
        }
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    let term = Term::stdout();
    let question = format!("{} {prompt} [y/N] ", style("?").yellow().bold());
    if term.write_str(&question).is_err() {
        return false;
    }
    // Unanswerable prompts must not create rows.
    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        if let Err(message) = init_logging(&level, log_dir) {
            print_warning(&message);
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Log {
            text,
            file,
            model,
            api_key,
            base_url,
            create_missing,
            skip_missing,
        } => {
            let conn = open_database(&cli.db)?;
            let decisions = if create_missing {
                DecisionMode::Approve
            } else if skip_missing {
                DecisionMode::Decline
            } else {
                DecisionMode::Interactive
            };
            let ingest = IngestService::new(
                SqliteDeliverableRepository::new(&conn),
                SqliteJournalRepository::new(&conn),
                decisions,
            );
            let extractor = api_key
                .map(|key| {
                    OpenAiExtractor::new(OpenAiConfig {
                        api_key: key,
                        model: model.clone(),
                        base_url: base_url.clone(),
                    })
                })
                .transpose()?;

            match (text, file) {
                (Some(text), None) => log_free_text(&ingest, extractor.as_ref(), &text),
                (None, Some(path)) => log_batch_file(&ingest, extractor.as_ref(), &path),
                _ => Err("provide exactly one of --text or --file".into()),
            }
        }
        Commands::Schedule { project } => {
            let conn = open_database(&cli.db)?;
            let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));
            match project {
                Some(name) => show_project_schedule(&service, &name),
                None => show_all_schedules(&service),
            }
        }
        Commands::Projects => {
            let conn = open_database(&cli.db)?;
            let repo = SqliteDeliverableRepository::new(&conn);
            let projects = repo.list_distinct_projects()?;
            if projects.is_empty() {
                println!("No projects yet.");
            }
            for project in projects {
                println!("{project}");
            }
            Ok(())
        }
    }
}

fn open_database(path: &Path) -> Result<Connection, Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(open_db(path)?)
}

fn log_free_text<R, J, D>(
    ingest: &IngestService<R, J, D>,
    extractor: Option<&OpenAiExtractor>,
    text: &str,
) -> Result<(), Box<dyn Error>>
where
    R: DeliverableRepository,
    J: dealnote_core::JournalRepository,
    D: DecisionProvider,
{
    let Some(extractor) = extractor else {
        return Err("OPENAI_API_KEY is required to log free-text entries".into());
    };

    let (note, tags) = split_inline_tags(text);
    let extraction = match extractor.extract(&note) {
        Ok(extraction) => extraction,
        Err(err) => {
            // Without extraction there is no project to file the note under.
            print_warning(&format!("extraction failed, entry not journaled: {err}"));
            return Ok(());
        }
    };

    if extraction.project_name.trim().is_empty() {
        print_warning("extraction returned no project name; entry not journaled");
        return Ok(());
    }

    let request = record_request(
        extraction.project_name.clone(),
        extraction.entry_type.clone(),
        note,
        tags,
        Some(&extraction),
    )?;
    let outcome = ingest.record_entry(&request)?;
    report_outcome(&request.project_name, &request.entry_type, &outcome);
    Ok(())
}

fn log_batch_file<R, J, D>(
    ingest: &IngestService<R, J, D>,
    extractor: Option<&OpenAiExtractor>,
    path: &Path,
) -> Result<(), Box<dyn Error>>
where
    R: DeliverableRepository,
    J: dealnote_core::JournalRepository,
    D: DecisionProvider,
{
    let content = std::fs::read_to_string(path)?;
    let parse = batch::parse_batch(&content);
    for warning in &parse.warnings {
        print_warning(warning);
    }
    if parse.entries.is_empty() {
        println!("No valid entries found. Use format: Project <Name> [<Type>]: Entry #tags");
        return Ok(());
    }

    let mut logged = 0usize;
    for entry in &parse.entries {
        let (note, tags) = split_inline_tags(&entry.note);

        // Extraction failure degrades to journaling the note with no
        // deliverables; the batch header already names the project.
        let extraction = match extractor {
            Some(extractor) => match extractor.extract(&note) {
                Ok(extraction) => Some(extraction),
                Err(err) => {
                    print_warning(&format!(
                        "extraction failed for '{}': {err}; journaling note only",
                        entry.project_name
                    ));
                    None
                }
            },
            None => {
                print_warning("no API key configured; journaling notes without deliverables");
                None
            }
        };

        let request = record_request(
            entry.project_name.clone(),
            entry.entry_type.clone(),
            note,
            tags,
            extraction.as_ref(),
        )?;
        let outcome = ingest.record_entry(&request)?;
        report_outcome(&request.project_name, &request.entry_type, &outcome);
        logged += 1;
    }

    println!(
        "{} Logged {logged} entries from {}",
        style("ok:").green().bold(),
        path.display()
    );
    Ok(())
}

/// Builds the record request; the batch header project wins over the
/// extracted one, so extraction only contributes the deliverable lists.
fn record_request(
    project_name: String,
    entry_type: String,
    raw_note: String,
    tags: Option<String>,
    extraction: Option<&ExtractedEntry>,
) -> Result<RecordEntryRequest, Box<dyn Error>> {
    let metadata = extraction
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| format!("extraction payload does not serialize: {err}"))?;

    Ok(RecordEntryRequest {
        project_name,
        entry_type,
        raw_note,
        tags,
        metadata,
        tasks: extraction.map(|e| e.deliverables.clone()).unwrap_or_default(),
        dates: extraction.map(|e| e.dates.clone()).unwrap_or_default(),
        owners: extraction.map(|e| e.owners.clone()).unwrap_or_default(),
        dependency_descs: extraction
            .map(|e| e.dependencies.clone())
            .unwrap_or_default(),
    })
}

fn report_outcome(project_name: &str, entry_type: &str, outcome: &RecordOutcome) {
    println!(
        "{} {project_name} [{entry_type}]: {} deliverable(s) recorded",
        style("logged").green().bold(),
        outcome.created
    );
    for warning in &outcome.warnings {
        print_warning(warning);
    }
}

fn show_project_schedule<R: DeliverableRepository>(
    service: &ScheduleService<R>,
    project_name: &str,
) -> Result<(), Box<dyn Error>> {
    let lines = service.view_project(project_name)?;
    if lines.is_empty() {
        println!("No deliverables found for '{project_name}'.");
        return Ok(());
    }

    println!("{}", style(format!("Schedule for {project_name}")).cyan());
    for line in lines {
        println!("  {line}");
    }
    Ok(())
}

fn show_all_schedules<R: DeliverableRepository>(
    service: &ScheduleService<R>,
) -> Result<(), Box<dyn Error>> {
    let table = service.view_all_projects()?;
    if table.rows.is_empty() {
        println!("No deliverables found.");
        return Ok(());
    }

    let mut current_project: Option<&str> = None;
    for row in &table.rows {
        if current_project != Some(row.project_name.as_str()) {
            println!("{}", style(&row.project_name).blue().bold());
            current_project = Some(row.project_name.as_str());
        }

        let date_label = row.due_date.as_deref().unwrap_or(dealnote_core::NO_DATE_LABEL);
        match row.depends_on.as_deref() {
            Some(dependency) => println!(
                "  {date_label}: {}  <- depends on: {dependency}",
                row.description
            ),
            None => println!("  {date_label}: {}", row.description),
        }
    }
    Ok(())
}

fn print_warning(message: &str) {
    eprintln!("{} {message}", style("warning:").yellow().bold());
}
