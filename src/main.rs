use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use transinia::api::{ApiClient, Envelope};
use transinia::config::{self, ClientConfig, TransiniaConfig};
use transinia::dashboard::DashboardStats;
use transinia::export::{self, ExportFormat};
use transinia::output::{json as json_out, table};

#[derive(Parser)]
#[command(name = "transinia", version, about = "Transinia — upload meeting transcripts and browse generated insights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL (overrides NEXT_PUBLIC_API_URL / NEXT_PUBLIC_BACKEND_URL)
    #[arg(long, global = true, env = "TRANSINIA_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload transcript files (.txt, .md, .docx)
    Upload {
        /// File paths or glob patterns
        paths: Vec<String>,
    },

    /// List uploaded transcripts
    List {
        /// Filter by file name (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Only transcripts that already have insights
        #[arg(long, conflicts_with = "pending")]
        processed: bool,

        /// Only transcripts without insights
        #[arg(long)]
        pending: bool,
    },

    /// Show the raw text of a transcript
    Transcript {
        /// Transcript ID
        id: String,
    },

    /// Generate insights for a transcript
    Generate {
        /// Transcript ID
        transcript_id: String,
    },

    /// Show meeting insights
    Show {
        /// Insight (meeting data) ID
        id: String,
    },

    /// List all meetings with insights
    Meetings,

    /// List open high priority tasks across meetings
    Tasks,

    /// Mark an action item as completed
    Complete {
        /// Insight (meeting data) ID
        insight_id: String,

        /// Action item ID
        action_id: String,

        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
    },

    /// Export meeting insights as Markdown minutes or JSON
    Export {
        /// Insight (meeting data) ID
        id: String,

        /// Export format: markdown, json
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Output file, directory, or "-" for stdout (default: current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show meeting and action item counts
    Dashboard,

    /// Check that the backend is reachable
    Health,

    /// Manage ~/.transinia/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective settings
    Show,
    /// Create the config file with a commented template
    Init,
    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    let file_config = TransiniaConfig::load()?;
    let client_config = ClientConfig::resolve(cli.api_url.as_deref(), cli.timeout, &file_config);

    if let Commands::Config { action } = cli.command {
        return run_config(action, &file_config, &client_config, json_output);
    }

    let client = ApiClient::new(&client_config)
        .with_context(|| format!("Cannot use backend URL: {}", client_config.base_url))?;

    match cli.command {
        Commands::Upload { paths } => {
            if paths.is_empty() {
                bail!("No paths provided.");
            }
            let files = expand_paths(&paths)?;
            let mut failed = 0usize;
            let mut results = Vec::new();

            for path in &files {
                let outcome = client.upload_transcript(path);
                if !json_output {
                    match &outcome {
                        Envelope::Success(up) => println!(
                            "Uploaded {} ({})",
                            path.display(),
                            up.file_id.as_deref().unwrap_or("no file id")
                        ),
                        Envelope::Failure { message } => {
                            eprintln!("FAILED {}: {}", path.display(), message)
                        }
                    }
                }
                if !outcome.is_success() {
                    failed += 1;
                }
                results.push(serde_json::json!({
                    "path": path.display().to_string(),
                    "result": outcome,
                }));
            }

            if json_output {
                json_out::print_json(&results)?;
            } else {
                let ok = files.len() - failed;
                println!("Uploaded {ok} transcript{}", if ok == 1 { "" } else { "s" });
            }
            if failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::List {
            search,
            processed,
            pending,
        } => {
            let transcripts: Vec<_> = client
                .get_transcripts()
                .into_iter()
                .filter(|t| search.as_deref().map_or(true, |q| t.matches_name(q)))
                .filter(|t| !processed || t.processed)
                .filter(|t| !pending || !t.processed)
                .collect();
            if json_output {
                json_out::print_json(&transcripts)?;
            } else {
                table::print_transcript_list(&transcripts);
            }
        }

        Commands::Transcript { id } => {
            let content = settle(client.get_transcript(&id), json_output)?;
            table::print_transcript_content(&content);
        }

        Commands::Generate { transcript_id } => {
            // Skip the backend round trip when the listing already knows the answer.
            let known = client
                .get_transcripts()
                .into_iter()
                .find(|t| t.id == transcript_id && t.processed)
                .and_then(|t| t.meeting_data_id);

            let outcome = match known {
                Some(meeting_data_id) => Envelope::Success(transinia::api::Generated {
                    message: "Meeting data already exists for this transcript".to_string(),
                    meeting_data_id: Some(meeting_data_id),
                    already_processed: true,
                }),
                None => {
                    if !json_output {
                        eprintln!("Generating insights for {transcript_id}...");
                    }
                    client.generate_insights(&transcript_id)
                }
            };

            let generated = settle(outcome, json_output)?;
            println!("{}", generated.message);
            match generated.meeting_data_id {
                Some(ref id) if generated.already_processed => {
                    println!("  Existing insights: {id}");
                    println!("  View with: transinia show {id}");
                }
                Some(ref id) => {
                    println!("  Insights: {id}");
                    println!("  View with: transinia show {id}");
                }
                None => {}
            }
        }

        Commands::Show { id } => {
            let insight = settle(client.get_insight(&id), json_output)?;
            table::print_insight_detail(&insight);
        }

        Commands::Meetings => {
            let meetings = client.get_meetings();
            if json_output {
                json_out::print_json(&meetings)?;
            } else {
                table::print_meeting_list(&meetings);
            }
        }

        Commands::Tasks => {
            let tasks = client.get_high_priority_tasks();
            if json_output {
                json_out::print_json(&tasks)?;
            } else {
                table::print_tasks(&tasks);
            }
        }

        Commands::Complete {
            insight_id,
            action_id,
            undo,
        } => {
            let updated = settle(
                client.update_action_item(&insight_id, &action_id, !undo),
                json_output,
            )?;
            println!("{}", updated.message);
        }

        Commands::Export { id, format, output } => {
            let format: ExportFormat = format.parse()?;
            let insight = match client.get_insight(&id) {
                Envelope::Success(insight) => insight,
                Envelope::Failure { message } => bail!(message),
            };

            match output {
                Some(ref p) if p.as_os_str() == "-" => {
                    print!("{}", export::render(&insight, format)?);
                }
                Some(ref p) if !p.is_dir() => {
                    std::fs::write(p, export::render(&insight, format)?)
                        .with_context(|| format!("Failed to write export: {}", p.display()))?;
                    eprintln!("Wrote {}", p.display());
                }
                Some(ref dir) => {
                    let path = export::write_to_dir(&insight, format, dir)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => {
                    let path = export::write_to_dir(&insight, format, std::path::Path::new("."))?;
                    eprintln!("Wrote {}", path.display());
                }
            }
        }

        Commands::Dashboard => {
            let meetings = client.get_meetings();
            let tasks = client.get_high_priority_tasks();
            let stats = DashboardStats::collect(&meetings, &tasks);
            if json_output {
                json_out::print_json(&stats)?;
            } else {
                table::print_dashboard(&stats);
            }
        }

        Commands::Health => {
            let health = settle(client.health(), json_output)?;
            match health.timestamp {
                Some(ts) => println!(
                    "{}: {} (backend time {})",
                    client.base_url(),
                    health.status,
                    ts.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("{}: {}", client.base_url(), health.status),
            }
        }

        Commands::Config { .. } => unreachable!("handled before client construction"),
    }

    Ok(())
}

/// Print a failure and exit non-zero, or hand back the payload. In JSON mode
/// the whole envelope is printed and the payload is only returned for
/// further human-readable output when not in JSON mode.
fn settle<T: serde::Serialize>(outcome: Envelope<T>, json_output: bool) -> Result<T> {
    if json_output {
        json_out::print_json(&outcome)?;
        std::process::exit(if outcome.is_success() { 0 } else { 1 });
    }
    match outcome {
        Envelope::Success(payload) => Ok(payload),
        Envelope::Failure { message } => bail!(message),
    }
}

fn run_config(
    action: ConfigAction,
    file_config: &TransiniaConfig,
    client_config: &ClientConfig,
    json_output: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "config_path": config::config_path()?.display().to_string(),
                    "base_url": client_config.base_url,
                    "timeout_secs": client_config.timeout.as_secs(),
                    "file": file_config,
                }))?;
            } else {
                println!("Effective settings:");
                println!("  base_url:     {}", client_config.base_url);
                println!("  timeout_secs: {}", client_config.timeout.as_secs());
                println!("\n{}:", config::config_path()?.display());
                println!("{}", file_config.display());
            }
        }
        ConfigAction::Init => {
            let path = config::config_path()?;
            if config::init_config()? {
                println!("Created {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Path => println!("{}", config::config_path()?.display()),
    }
    Ok(())
}

/// Expand file paths and glob patterns into a list of files.
fn expand_paths(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path_str in paths {
        let path = PathBuf::from(path_str);
        if path.is_file() {
            files.push(path);
            continue;
        }
        let matches: Vec<_> = glob::glob(path_str)
            .with_context(|| format!("Invalid path or glob pattern: {path_str}"))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            bail!("No files found matching: {path_str}");
        }
        files.extend(matches);
    }
    Ok(files)
}
