//! Discipline CLI
//!
//! Administer project disciplines against the remote API.
//!
//! ```bash
//! discipline list --search struct
//! discipline create --name Structural --project 3a0f...
//! discipline edit <ID> --description "Frames and slabs"
//! discipline delete <ID> --yes
//! discipline mock-server --seed          # local stand-in API
//! ```

mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use discipline_api::mock::{MockCredentials, MockServer};
use discipline_api::wire::DisciplineDto;
use discipline_api::RestClient;
use discipline_config::ApiConfig;
use discipline_core::{DisciplineDraft, ProjectRef};
use discipline_service::{DisciplineController, DisciplineService, DisciplineStore, ServicePolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "discipline")]
#[command(about = "Manage project disciplines")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/discipline/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List disciplines
    List {
        /// Filter by code, name or description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one discipline
    Show { id: String },

    /// Create a discipline; its code is assigned automatically
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Project id
        #[arg(short, long)]
        project: Option<String>,

        #[arg(long)]
        inactive: bool,
    },

    /// Edit a discipline (the code cannot be changed)
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Project id; pass "" to detach
        #[arg(short, long)]
        project: Option<String>,

        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        #[arg(long)]
        inactive: bool,
    },

    /// Delete a discipline
    Delete {
        id: String,

        /// Confirm the deletion; it cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// List projects available for selection
    Projects,

    /// Run an in-memory stand-in of the remote API
    MockServer {
        #[arg(long, default_value = "127.0.0.1:44300")]
        bind: String,

        /// Pre-load sample projects and disciplines
        #[arg(long)]
        seed: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "warn,discipline_cli=info,discipline_service=info,discipline_api=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        if let Some(hint) = hint(&e) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

/// Extra line for errors the user can fix by changing the input
fn hint(e: &anyhow::Error) -> Option<&'static str> {
    e.downcast_ref::<discipline_core::Error>()
        .filter(|e| e.is_user_correctable())
        .map(|_| "correct the input and run the command again")
}

/// Controller over the configured remote API
fn connect(config_path: Option<&Path>) -> Result<DisciplineController<RestClient>> {
    let config = ApiConfig::load(config_path).context("loading configuration")?;
    tracing::debug!(?config, "configuration resolved");

    let policy = ServicePolicy::from(&config);
    let client = RestClient::new(config)?;
    Ok(DisciplineController::new(
        DisciplineService::new(client, policy),
        Arc::new(DisciplineStore::new()),
    ))
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        json,
        command,
    } = cli;
    let config = config.as_deref();

    match command {
        Commands::MockServer { bind, seed } => return mock_server(&bind, seed).await,

        Commands::List { search } => {
            let controller = connect(config)?;
            controller.load_list().await?;
            let state = controller.store().snapshot();
            let shown = DisciplineService::<RestClient>::search(&state.list, search.as_deref().unwrap_or(""));

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                print!("{}", output::discipline_table(&shown));
            }
        }

        Commands::Show { id } => {
            let controller = connect(config)?;
            let Some(found) = controller.load_selected(&id).await? else {
                bail!("discipline {id} not found");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print!("{}", output::discipline_detail(&found));
            }
        }

        Commands::Create {
            name,
            description,
            project,
            inactive,
        } => {
            let controller = connect(config)?;
            let mut draft = DisciplineDraft::named(name).with_description(description);
            if let Some(project) = project {
                draft = draft.with_project(project);
            }
            if inactive {
                draft = draft.inactive();
            }

            let created = controller.create(draft).await?;
            println!("Created {} ({})", created.code, created.id);
        }

        Commands::Edit {
            id,
            name,
            description,
            project,
            active,
            inactive,
        } => {
            let controller = connect(config)?;
            let Some(mut record) = controller.load_selected(&id).await? else {
                bail!("discipline {id} not found");
            };

            if let Some(name) = name {
                record.name = name;
            }
            if let Some(description) = description {
                record.description = description;
            }
            if let Some(project) = project {
                record.project = Some(project)
                    .filter(|p| !p.trim().is_empty())
                    .map(ProjectRef::new);
            }
            if active {
                record.is_active = true;
            }
            if inactive {
                record.is_active = false;
            }

            let updated = controller.update(&id, &record).await?;
            println!("Updated {} ({})", updated.code, updated.id);
        }

        Commands::Delete { id, yes } => {
            if !yes {
                bail!("deleting {id} cannot be undone; pass --yes to confirm");
            }
            let controller = connect(config)?;
            controller.delete(&id).await?;
            println!("Deleted {id}");
        }

        Commands::Projects => {
            let controller = connect(config)?;
            let projects = controller.load_projects().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                print!("{}", output::project_table(&projects));
            }
        }
    }

    Ok(())
}

async fn mock_server(bind: &str, seed: bool) -> Result<()> {
    let credentials = MockCredentials::default();
    let server = MockServer::bind(bind, credentials.clone())
        .await
        .with_context(|| format!("binding {bind}"))?;

    if seed {
        server.seed_project("p-tower-a", "Tower A").await;
        server.seed_project("p-tower-b", "Tower B").await;
        for (code, name, description) in [
            ("DISC01", "Structural", "Frames, slabs and foundations"),
            ("DISC02", "Electrical", "Power and lighting"),
            ("DISC03", "Plumbing", "Water supply and drainage"),
        ] {
            server
                .seed_discipline(DisciplineDto {
                    code: Some(code.into()),
                    name: Some(name.into()),
                    description: Some(description.into()),
                    is_active: Some(true),
                    project_id: Some("p-tower-a".into()),
                    project_name: Some("Tower A".into()),
                    ..DisciplineDto::default()
                })
                .await;
        }
    }

    eprintln!("Mock API listening on {}", server.url());
    eprintln!("  {}={}/api/app", discipline_config::ENV_API_URL, server.url());
    eprintln!("  {}={}/connect/token", discipline_config::ENV_TOKEN_URL, server.url());
    eprintln!(
        "  {}={} {}={} {}=<see MockCredentials>",
        discipline_config::ENV_CLIENT_ID,
        credentials.client_id,
        discipline_config::ENV_USERNAME,
        credentials.username,
        discipline_config::ENV_PASSWORD,
    );

    tokio::select! {
        _ = server.run_until_stopped() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down mock server");
        }
    }
    Ok(())
}
