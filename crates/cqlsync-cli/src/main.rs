use camino::Utf8PathBuf;
use cqlsync::{KeyspaceSnapshot, Model, Reconciler, SnapshotCatalog};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;

mod config;

/// Reconcile a declared data model against a CQL keyspace.
#[derive(Facet, Debug)]
struct Cli {
    /// Show version information
    #[facet(args::named, args::short = 'V')]
    version: bool,

    /// Configuration file (defaults to the nearest .config/cqlsync.styx)
    #[facet(default, args::named, args::short = 'c')]
    config: Option<String>,

    /// Command to run
    #[facet(default, args::subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Commands {
    /// Show the statements that would bring a keyspace snapshot up to date
    Plan {
        /// JSON keyspace snapshot (defaults to `snapshot` from the configuration)
        #[facet(default, args::named)]
        snapshot: Option<String>,
    },
    /// List the declared entities and their CREATE statements
    Entities,
    /// Split a statement script and print its statements
    Script {
        /// Script file, statements separated by blank lines
        #[facet(args::positional)]
        path: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cqlsync=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let result: Result<Cli, _> = args::from_slice(&args_ref);

    match result {
        Ok(cli) => {
            if let Err(e) = run(cli).await {
                eprintln!("{} {}", "error:".red().bold(), e);
                let mut source = e.source();
                while let Some(cause) = source {
                    eprintln!("  {} {}", "caused by:".dimmed(), cause);
                    source = cause.source();
                }
                std::process::exit(1);
            }
        }
        Err(err) if err.is_help_request() => {
            print!("{}", err.help_text().unwrap_or(""));
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn run(cli: Cli) -> Result<(), BoxError> {
    if cli.version {
        println!("cqlsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match cli.command {
        Some(Commands::Plan { snapshot }) => {
            let loaded = load_config(cli.config.as_deref())?;
            let model = loaded.config.model()?;

            let snapshot_path = match snapshot.or_else(|| loaded.config.snapshot.clone()) {
                Some(path) => loaded.resolve(&path),
                None => return Err("no snapshot given; pass --snapshot or set `snapshot`".into()),
            };
            let snapshot = KeyspaceSnapshot::from_path(&snapshot_path)?;
            if snapshot.keyspace != loaded.config.keyspace {
                tracing::warn!(
                    configured = %loaded.config.keyspace,
                    snapshot = %snapshot.keyspace,
                    "snapshot is of another keyspace"
                );
            }

            let catalog = SnapshotCatalog::from_snapshot(&snapshot);
            let reconciler = Reconciler::new(&catalog, &snapshot.keyspace)
                .with_options(loaded.config.options()?);
            let plan = reconciler.plan(&model).await?;

            print!("{}", plan);
            if !plan.is_empty() {
                println!();
                println!("{}", "Statements:".bold());
                for statement in plan.statements() {
                    println!();
                    println!("{}", statement.cyan());
                }
            }
        }
        Some(Commands::Entities) => {
            let loaded = load_config(cli.config.as_deref())?;
            let model = loaded.config.model()?;
            print_entities(&loaded.config.keyspace, &model);
        }
        Some(Commands::Script { path }) => {
            let statements = cqlsync::maintenance::read_script(&path)?;
            println!("{} ({} statements)", path.bold(), statements.len());
            for (idx, statement) in statements.iter().enumerate() {
                println!("  {} {}", format!("{:>3}.", idx + 1).dimmed(), statement);
            }
        }
        None => {
            let config = args::HelpConfig {
                program_name: Some("cqlsync".to_string()),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                ..Default::default()
            };
            print!("{}", args::generate_help::<Cli>(&config));
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&str>) -> Result<config::Loaded, config::ConfigError> {
    match explicit {
        Some(path) => config::load_file(&Utf8PathBuf::from(path)),
        None => config::load(),
    }
}

fn print_entities(keyspace: &str, model: &Model) {
    if model.is_empty() {
        println!("No entities declared.");
        return;
    }

    println!("Keyspace {} ({} entities):", keyspace.bold(), model.len());
    for entity in model {
        println!();
        println!("  {}", entity.name().green().bold());
        for (name, column_type) in entity.columns() {
            let marker = if entity.keys().contains(name) {
                " (key)"
            } else {
                ""
            };
            println!("    {}: {}{}", name, column_type, marker.yellow());
        }
        println!();
        for line in cqlsync::create_table_sql(entity).lines() {
            println!("    {}", line.dimmed());
        }
    }
}
