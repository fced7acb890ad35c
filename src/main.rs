use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use scenario_review::admin;
use scenario_review::api::{AnalysisClient, AnalysisService};
use scenario_review::chat::{self, ReplyMode};
use scenario_review::config::{self, Config};
use scenario_review::db::models::Conversation;
use scenario_review::db::Database;
use scenario_review::export::{self, pdf::PdfOptions};
use scenario_review::output::notice::{self, Notice};
use scenario_review::output::{json as json_out, table};
use scenario_review::report::{Category, Rating};
use scenario_review::review::session::ReviewSession;
use scenario_review::review::versions::rating_changes;
use scenario_review::upload;

#[derive(Parser)]
#[command(name = "screview", version, about = "Scenario Review: upload scripts for content-rating analysis and review the results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to database file (default: ~/.screview/screview.db)
    #[arg(long, global = true, env = "SCREVIEW_DB")]
    db: Option<PathBuf>,

    /// Analysis service base URL
    #[arg(long, global = true, env = "SCREVIEW_API_URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload scripts for analysis (.txt, .pdf, .docx)
    Upload {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        paths: Vec<String>,

        /// List the files that would be uploaded
        #[arg(long)]
        dry_run: bool,
    },

    /// Stored scenarios
    Scenarios {
        #[command(subcommand)]
        command: ScenarioCommands,
    },

    /// Compare ratings of scenarios, oldest first
    Compare {
        /// Scenario IDs in order (default: your scenarios by upload time)
        ids: Vec<String>,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Review a scenario interactively
    Review {
        /// Scenario ID
        id: String,

        /// Target age rating for recommendations (e.g. 12+)
        #[arg(long)]
        target: Option<String>,
    },

    /// Export a scenario's report
    Export {
        /// Scenario ID
        id: String,

        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Include the charts page (PDF)
        #[arg(long)]
        charts: bool,

        /// Include the timeline page (PDF)
        #[arg(long)]
        timeline: bool,
    },

    /// Chat with the analysis assistant
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Administration (requires the admin role)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Manage ~/.screview/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show database info
    Info,
}

#[derive(Subcommand)]
enum ScenarioCommands {
    /// List scenarios
    List {
        /// Include every user's scenarios
        #[arg(long)]
        all: bool,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show a scenario's report
    Show { id: String },

    /// Delete a scenario
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Start a conversation
    New {
        #[arg(long, default_value = chat::DEFAULT_TITLE)]
        title: String,
    },

    /// List your conversations, most recently active first
    List,

    /// Print a conversation's messages
    Log {
        /// Conversation ID (default: most recent)
        id: Option<String>,
    },

    /// Send one message and print the reply
    Send {
        message: String,

        /// Conversation ID (default: most recent, or a new one)
        #[arg(long)]
        id: Option<String>,

        /// Use the canned reply instead of calling the service
        #[arg(long)]
        offline: bool,
    },

    /// Interactive conversation
    Open {
        /// Conversation ID (default: most recent, or a new one)
        id: Option<String>,

        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Grant a role (the first admin may grant themselves)
    Grant {
        user: String,

        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// Revoke a role
    Revoke {
        user: String,

        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage tests
    Tests {
        #[command(subcommand)]
        command: TestCommands,
    },

    /// Store a scenario with a locally computed placeholder analysis
    Analyze {
        #[arg(long)]
        title: String,

        /// Read the scenario text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Scenario text
        #[arg(long)]
        text: Option<String>,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    List,
    Add {
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Delete {
        /// Category ID or name
        id: String,
    },
}

#[derive(Subcommand)]
enum TestCommands {
    List,
    Add {
        title: String,

        #[arg(long)]
        content: String,

        /// Category ID or name
        #[arg(long)]
        category: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default config file
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Pdf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;
    let config = Config::load()?;

    if let Commands::Config { command } = &cli.command {
        return run_config(command, &config, json_output);
    }

    let db_path = match cli.db {
        Some(p) => p,
        None => Database::default_db_path()?,
    };
    let db = Database::open(&db_path)?;
    let user = config.resolve_user();
    let client = AnalysisClient::new(config.resolve_base_url(cli.api_url.as_deref()));

    match cli.command {
        Commands::Upload { paths, dry_run } => {
            let summary = upload::upload_paths(&db, &client, &paths, &user, dry_run)?;
            if json_output {
                let uploaded: Vec<_> = summary
                    .uploaded
                    .iter()
                    .map(|u| {
                        serde_json::json!({
                            "path": u.path,
                            "scenario_id": u.scenario.id,
                            "report": u.report,
                        })
                    })
                    .collect();
                let failed: Vec<_> = summary
                    .failed
                    .iter()
                    .map(|(p, e)| serde_json::json!({ "path": p, "error": e }))
                    .collect();
                json_out::print_json(&serde_json::json!({
                    "uploaded": uploaded,
                    "failed": failed,
                    "would_upload": summary.would_upload,
                }))?;
            } else if dry_run {
                for p in &summary.would_upload {
                    println!("  {}", p.display());
                }
                println!("Would upload {} file{}", summary.would_upload.len(), plural(summary.would_upload.len()));
            } else {
                for u in &summary.uploaded {
                    println!("{} -> {} ({})", u.path.display(), u.report.overall_rating, u.scenario.id);
                }
                println!(
                    "Uploaded {} file{}, {} failed",
                    summary.uploaded.len(),
                    plural(summary.uploaded.len()),
                    summary.failed.len()
                );
            }
            if !summary.failed.is_empty() && summary.uploaded.is_empty() && !dry_run {
                bail!("No files were analyzed");
            }
        }

        Commands::Scenarios { command } => match command {
            ScenarioCommands::List { all, limit } => {
                let owner = if all { None } else { Some(user.as_str()) };
                let results = db.list_scenarios(owner, limit)?;
                if json_output {
                    json_out::print_json(&results)?;
                } else {
                    table::print_scenario_list(&results);
                }
            }

            ScenarioCommands::Show { id } => {
                let session = open_session(&db, &id, config.target_rating()?)?;
                if json_output {
                    json_out::print_json(&session.report)?;
                } else {
                    table::print_report_overview(&session.title, &session.report);
                    println!();
                    table::print_parents_guide(&session.violations);
                }
            }

            ScenarioCommands::Delete { id, force } => {
                let s = db
                    .get_scenario(&id)?
                    .with_context(|| format!("Scenario not found: {id}"))?;
                if !force && !confirm(&format!("Delete \"{}\" ({})?", s.title, id))? {
                    println!("Cancelled.");
                    return Ok(());
                }
                db.delete_scenario(&id)?;
                println!("Deleted: {} ({})", s.title, id);
            }
        },

        Commands::Compare { ids, limit } => {
            let entries: Vec<(String, Rating)> = if ids.is_empty() {
                let mut list = db.list_scenarios(Some(&user), limit)?;
                list.reverse();
                list.into_iter()
                    .map(|s| (s.title, Rating::parse(s.rating.as_deref().unwrap_or_default())))
                    .collect()
            } else {
                let mut out = Vec::new();
                for id in &ids {
                    let s = db
                        .get_scenario(id)?
                        .with_context(|| format!("Scenario not found: {id}"))?;
                    let rating = s
                        .analysis_data
                        .as_ref()
                        .and_then(|d| d.get("overall_rating"))
                        .and_then(|r| r.as_str())
                        .map(Rating::parse)
                        .unwrap_or_default();
                    out.push((s.title, rating));
                }
                out
            };
            let changes = rating_changes(&entries);
            if json_output {
                json_out::print_json(&changes)?;
            } else {
                table::print_comparison(&changes);
            }
        }

        Commands::Review { id, target } => {
            let target = match target {
                Some(t) => config::parse_target(&t)?,
                None => config.target_rating()?,
            };
            let mut session = open_session(&db, &id, target)?;
            if json_output {
                print_session_json(&session)?;
            } else {
                run_review(&mut session, &client)?;
            }
        }

        Commands::Export {
            id,
            format,
            out,
            charts,
            timeline,
        } => {
            let session = open_session(&db, &id, config.target_rating()?)?;
            let path = export_session(&session, format, &out, PdfOptions { charts, timeline })?;
            if json_output {
                json_out::print_json(&serde_json::json!({ "path": path }))?;
            } else {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Chat { command } => run_chat(command, &db, &client, &user, json_output)?,

        Commands::Admin { command } => run_admin(command, &db, &user, json_output)?,

        Commands::Config { .. } => unreachable!("handled before opening the database"),

        Commands::Info => {
            let stats = db.stats()?;
            let schema_ver = db.schema_version()?.unwrap_or_else(|| "unknown".to_string());

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "schema_version": schema_ver,
                    "db_path": db.path.display().to_string(),
                    "api_url": client.base_url(),
                    "user": user,
                    "stats": stats,
                }))?;
            } else {
                println!("screview v{}", env!("CARGO_PKG_VERSION"));
                println!("  Schema:   v{schema_ver}");
                println!("  Database: {}", db.path.display());
                println!("  API:      {}", client.base_url());
                println!("  User:     {user}");
                println!();
                table::print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Load a stored scenario into a fresh review session.
fn open_session(db: &Database, id: &str, target: Rating) -> Result<ReviewSession> {
    let scenario = db
        .get_scenario(id)?
        .with_context(|| format!("Scenario not found: {id}"))?;
    ReviewSession::from_scenario(&scenario, target)
}

fn print_session_json(session: &ReviewSession) -> Result<()> {
    json_out::print_json(&serde_json::json!({
        "scenario_id": session.scenario_id,
        "title": session.title,
        "target_rating": session.target,
        "report": session.report,
        "violations": session.violations,
        "chart": session.chart_data(),
        "timeline": session.timeline(),
        "recommendations": session.recommendations,
        "versions": session.history.versions(),
    }))
}

fn export_session(session: &ReviewSession, format: ExportFormat, out: &Path, opts: PdfOptions) -> Result<PathBuf> {
    match format {
        ExportFormat::Json => export::json::write(out, &session.report, &session.violations, &session.title),
        ExportFormat::Pdf => export::pdf::write(out, &session.report, opts),
    }
}

const REVIEW_HELP: &str = "\
Commands:
  overview                      rating, summary and statistics
  guide                         parents guide with episodes
  fp <category> <n>             toggle false positive on episode n
  scenes [query]                list scenes, optionally searching text
  filter <category>|clear       toggle a category filter
  edit <scene> <text>           replace a scene's text
  reanalyze <scene>             re-run analysis on a scene
  recs                          recommendations for the target rating
  apply <rec> <n>               apply suggestion n of a recommendation
  history                       version history
  restore <version>             restore an older version
  timeline                      violation timeline
  charts                        violation charts
  export json|pdf [dir]         export the current state
  quit";

/// Line-oriented review loop over stdin.
fn run_review(session: &mut ReviewSession, service: &dyn AnalysisService) -> Result<()> {
    table::print_report_overview(&session.title, &session.report);
    println!("\nType 'help' for commands.");

    let stdin = std::io::stdin();
    loop {
        print!("review> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "" => {}
            "quit" | "exit" | "q" => break,
            "help" => println!("{REVIEW_HELP}"),
            "overview" => table::print_report_overview(&session.title, &session.report),
            "guide" => table::print_parents_guide(&session.violations),
            "fp" => {
                let mut parts = rest.split_whitespace();
                let (Some(cat), Some(idx)) = (parts.next(), parts.next()) else {
                    println!("usage: fp <category> <n>");
                    continue;
                };
                let Some(category) = Category::from_key(cat) else {
                    notice::emit(&Notice::error("Unknown category", cat));
                    continue;
                };
                let Ok(index) = idx.parse::<usize>() else {
                    println!("usage: fp <category> <n>");
                    continue;
                };
                match session.toggle_false_positive(category, index) {
                    Ok(true) => println!("{} episode {index} marked as a false positive", category.label()),
                    Ok(false) => println!("{} episode {index} restored", category.label()),
                    Err(e) => notice::emit(&Notice::error("Cannot toggle", e.to_string())),
                }
            }
            "scenes" => {
                session.filter.query = (!rest.is_empty()).then(|| rest.to_string());
                table::print_scenes(&session.filtered_scenes());
            }
            "filter" => {
                if rest == "clear" {
                    session.filter.clear();
                    println!("Filters cleared.");
                } else if Category::from_key(rest).is_some() {
                    let on = session.filter.toggle_category(rest);
                    println!("{rest} filter {}", if on { "on" } else { "off" });
                } else {
                    let available = scenario_review::review::filter::available_categories(session.report.scenes());
                    println!("Available categories: {}", available.join(", "));
                }
            }
            "edit" => {
                let Some((scene_id, text)) = rest.split_once(' ') else {
                    println!("usage: edit <scene> <text>");
                    continue;
                };
                match session.edit_scene(scene_id, text.trim()) {
                    Ok(v) => println!("Saved as {}", v.id),
                    Err(e) => {
                        notice::emit(&Notice::error("Edit failed", e.to_string()));
                        continue;
                    }
                }
                if let Ok(Some(n)) = session.violation_warning(scene_id) {
                    notice::emit(&Notice::info("Heavy scene", format!("scene {scene_id} carries {n} violation labels")));
                }
            }
            "reanalyze" => match session.reanalyze_scene(service, rest) {
                Ok(labels) if labels.is_empty() => {
                    notice::emit(&Notice::success("Re-analysis complete", "no violations found"));
                }
                Ok(labels) => notice::emit(&Notice::success("Re-analysis complete", labels.join(", "))),
                Err(e) => notice::emit(&Notice::error("Re-analysis failed", e.to_string())),
            },
            "recs" => table::print_recommendations(&session.recommendations),
            "apply" => {
                let mut parts = rest.split_whitespace();
                let (Some(id), Some(idx)) = (parts.next(), parts.next().and_then(|n| n.parse::<usize>().ok())) else {
                    println!("usage: apply <rec> <n>");
                    continue;
                };
                match session.apply_recommendation(id, idx) {
                    Ok(v) => notice::emit(&Notice::success("Recommendation applied", format!("saved as {}", v.id))),
                    Err(e) => notice::emit(&Notice::error("Cannot apply", e.to_string())),
                }
            }
            "history" => table::print_versions(&session.history),
            "restore" => match session.restore(rest) {
                Ok(()) => notice::emit(&Notice::success("Version restored", rest)),
                Err(e) => notice::emit(&Notice::error("Cannot restore", e.to_string())),
            },
            "timeline" => table::print_timeline(&session.timeline()),
            "charts" => table::print_charts(&session.chart_data()),
            "export" => {
                let (fmt, dir) = rest.split_once(' ').unwrap_or((rest, "."));
                let format = match fmt {
                    "json" => ExportFormat::Json,
                    "pdf" => ExportFormat::Pdf,
                    _ => {
                        println!("usage: export json|pdf [dir]");
                        continue;
                    }
                };
                let opts = PdfOptions {
                    charts: true,
                    timeline: true,
                };
                match export_session(session, format, Path::new(dir.trim()), opts) {
                    Ok(path) => notice::emit(&Notice::success("Exported", path.display().to_string())),
                    Err(e) => notice::emit(&Notice::error("Export failed", format!("{e:#}"))),
                }
            }
            other => println!("Unknown command: {other}. Type 'help'."),
        }
    }
    Ok(())
}

/// Conversation to use: the given one, else the most recent, else a new one.
fn resolve_conversation(db: &Database, user: &str, id: Option<String>, create: bool) -> Result<Conversation> {
    if let Some(id) = id {
        return db
            .get_conversation(&id)?
            .with_context(|| format!("Conversation not found: {id}"));
    }
    if let Some(latest) = db.list_conversations(user)?.into_iter().next() {
        return Ok(latest);
    }
    if create {
        return db.create_conversation(user, chat::DEFAULT_TITLE);
    }
    bail!("No conversations yet. Start one with `screview chat new`.")
}

fn reply_mode(offline: bool) -> ReplyMode {
    if offline {
        ReplyMode::Offline
    } else {
        ReplyMode::Live
    }
}

fn run_chat(command: ChatCommands, db: &Database, service: &dyn AnalysisService, user: &str, json_output: bool) -> Result<()> {
    match command {
        ChatCommands::New { title } => {
            let c = db.create_conversation(user, &title)?;
            if json_output {
                json_out::print_json(&c)?;
            } else {
                println!("Created conversation {} ({})", c.title, c.id);
            }
        }

        ChatCommands::List => {
            let list = db.list_conversations(user)?;
            if json_output {
                json_out::print_json(&list)?;
            } else {
                table::print_conversations(&list);
            }
        }

        ChatCommands::Log { id } => {
            let c = resolve_conversation(db, user, id, false)?;
            let messages = db.list_messages(&c.id)?;
            if json_output {
                json_out::print_json(&serde_json::json!({ "conversation": c, "messages": messages }))?;
            } else {
                println!("Conversation: {} ({})\n", c.title, c.id);
                table::print_messages(&messages);
            }
        }

        ChatCommands::Send { message, id, offline } => {
            let c = resolve_conversation(db, user, id, true)?;
            let exchange = chat::send_message(db, service, &c.id, &message, reply_mode(offline))?;
            if exchange.fell_back && !offline {
                notice::emit(&Notice::error("Analysis unavailable", "showing the fallback reply"));
            }
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "conversation_id": c.id,
                    "user": exchange.user,
                    "assistant": exchange.assistant,
                    "fell_back": exchange.fell_back,
                }))?;
            } else {
                table::print_message(&exchange.assistant);
            }
        }

        ChatCommands::Open { id, offline } => {
            let c = resolve_conversation(db, user, id, true)?;
            println!("Conversation: {} ({})  /quit to leave\n", c.title, c.id);
            table::print_messages(&db.list_messages(&c.id)?);

            let feed = db.subscribe(&c.id);
            let stdin = std::io::stdin();
            loop {
                print!("> ");
                std::io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim() == "/quit" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = chat::send_message(db, service, &c.id, &line, reply_mode(offline)) {
                    notice::emit(&Notice::error("Failed to send message", format!("{e:#}")));
                }
                for m in feed.drain() {
                    table::print_message(&m);
                    println!();
                }
            }
        }
    }
    Ok(())
}

fn run_admin(command: AdminCommands, db: &Database, user: &str, json_output: bool) -> Result<()> {
    if let AdminCommands::Grant { user: target, role } = &command {
        admin::grant(db, user, target, role)?;
        println!("Granted {role} to {target}");
        return Ok(());
    }
    admin::require_admin(db, user)?;

    match command {
        AdminCommands::Grant { .. } => {}

        AdminCommands::Revoke { user: target, role } => {
            if db.revoke_role(&target, &role)? {
                println!("Revoked {role} from {target}");
            } else {
                println!("{target} did not have {role}");
            }
        }

        AdminCommands::Categories { command } => match command {
            CategoryCommands::List => {
                let list = db.list_categories()?;
                if json_output {
                    json_out::print_json(&list)?;
                } else {
                    table::print_categories(&list);
                }
            }
            CategoryCommands::Add { name, description } => {
                let c = db.create_category(&name, &description)?;
                notice::emit(&Notice::success("Category created", c.name.clone()));
                if json_output {
                    json_out::print_json(&c)?;
                }
            }
            CategoryCommands::Delete { id } => {
                let c = db
                    .find_category(&id)?
                    .with_context(|| format!("Category not found: {id}"))?;
                db.delete_category(&c.id)?;
                notice::emit(&Notice::success("Category deleted", c.name));
            }
        },

        AdminCommands::Tests { command } => match command {
            TestCommands::List => {
                let list = db.list_tests()?;
                if json_output {
                    json_out::print_json(&list)?;
                } else {
                    table::print_tests(&list);
                }
            }
            TestCommands::Add { title, content, category } => {
                let category_id = match category {
                    Some(c) => Some(
                        db.find_category(&c)?
                            .with_context(|| format!("Category not found: {c}"))?
                            .id,
                    ),
                    None => None,
                };
                let t = db.create_test(&title, &content, category_id.as_deref())?;
                notice::emit(&Notice::success("Test created", t.title.clone()));
                if json_output {
                    json_out::print_json(&t)?;
                }
            }
            TestCommands::Delete { id } => {
                if !db.delete_test(&id)? {
                    bail!("Test not found: {id}");
                }
                notice::emit(&Notice::success("Test deleted", id));
            }
        },

        AdminCommands::Analyze { title, file, text } => {
            let content = match (file, text) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read: {}", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => bail!("Provide --file or --text"),
            };
            let (scenario, analysis) = admin::analyze_scenario(db, user, &title, &content)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "scenario_id": scenario.id,
                    "analysis": analysis,
                }))?;
            } else {
                println!("Stored {} ({})", scenario.title, scenario.id);
                println!("  Age rating: {}", analysis.age_rating);
                println!("  Sentiment:  {}", analysis.sentiment);
                println!("  Themes:     {}", analysis.themes.join(", "));
                println!("  Scenes:     {}", analysis.scenes);
                println!("  Characters: {}", analysis.characters);
                println!("  Duration:   ~{} min", analysis.duration);
                println!("  Score:      {}", analysis.score);
            }
        }
    }
    Ok(())
}

fn run_config(command: &ConfigCommands, config: &Config, json_output: bool) -> Result<()> {
    match command {
        ConfigCommands::Init => {
            let path = config::config_path()?;
            if config::init_config()? {
                println!("Wrote {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigCommands::Show => {
            if json_output {
                json_out::print_json(config)?;
            } else {
                println!("{}", config.display()?);
            }
        }
    }
    Ok(())
}
