use anyhow::{bail, Context};
use clap::{value_parser, Arg, Command};
use ml_inline_server::prelude::*;
use ml_inline_server::{logging, VERSION};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_arg = || {
        Arg::new("config")
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .help("TOML configuration file")
    };
    let seed_arg = || {
        Arg::new("seed")
            .long("seed")
            .value_parser(value_parser!(PathBuf))
            .help("JSON seed with records, editors and sessions")
    };

    let cli = Command::new("ml-inline-server")
        .version(VERSION)
        .about("Inline save endpoint for image attachment alt text, title and description")
        .subcommand_required(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the save endpoint")
                .arg(config_arg())
                .arg(seed_arg())
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address, overrides the config file"),
                ),
        )
        .subcommand(
            Command::new("columns")
                .about("Print the inline cells for every seeded record")
                .arg(config_arg())
                .arg(seed_arg().required(true))
                .arg(
                    Arg::new("session")
                        .long("session")
                        .required(true)
                        .help("Seeded session id to render for"),
                ),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate a configuration file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => {
            let mut config = load_config(args.get_one::<PathBuf>("config"))?;
            if let Some(bind) = args.get_one::<SocketAddr>("bind") {
                config = config.with_bind(*bind);
            }
            if let Some(seed) = args.get_one::<PathBuf>("seed") {
                config = config.with_seed_path(seed.clone());
            }
            logging::init(&config.log_filter, config.json_logs)?;
            serve(config).await
        }
        Some(("columns", args)) => {
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            let seed = args.get_one::<PathBuf>("seed").context("--seed is required")?;
            let session = args
                .get_one::<String>("session")
                .context("--session is required")?;
            print_columns(config, seed.clone(), session).await
        }
        Some(("check-config", args)) => {
            let path = args.get_one::<PathBuf>("path").context("path is required")?;
            let config = ServerConfig::load(path)?;
            println!("{} is valid", path.display());
            println!("  bind:    {}", config.bind);
            println!("  route:   /{}", config.route);
            println!("  action:  {}", config.action);
            println!("  session: {}s", config.session_window_secs);
            Ok(())
        }
        _ => bail!("unknown subcommand"),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => Ok(ServerConfig::load(path)?),
        None => Ok(ServerConfig::default()),
    }
}

fn build_state(config: ServerConfig) -> anyhow::Result<(AppState, Arc<SessionTable>)> {
    let seed = match &config.seed_path {
        Some(path) => SeedFile::load(path)?,
        None => SeedFile::default(),
    };
    let parts = seed.into_parts(config.session_window_secs);
    let issuer = Arc::new(CsrfIssuer::new(config.signing_key()?));
    let sessions = Arc::new(parts.sessions);

    let state = AppState::new(
        config,
        Arc::new(parts.store),
        Arc::new(parts.grants),
        sessions.clone(),
        issuer,
    );
    Ok((state, sessions))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let (state, sessions) = build_state(config)?;
    tracing::info!(sessions = sessions.len(), "seeded");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {}", e);
        }
    };

    let (addr, server) = http::bind(Arc::new(state), shutdown)?;
    tracing::info!("save endpoint listening on http://{}", addr);
    server.await;
    tracing::info!("shut down");
    Ok(())
}

async fn print_columns(
    config: ServerConfig,
    seed_path: PathBuf,
    session_id: &str,
) -> anyhow::Result<()> {
    let seed = SeedFile::load(&seed_path)?;
    let ids: Vec<_> = seed.records.iter().map(|r| (r.id, r.mime_type.clone())).collect();

    let (state, sessions) = build_state(config.with_seed_path(seed_path))?;
    let Some(session) = sessions.resolve(session_id) else {
        bail!("no seeded session '{}'", session_id);
    };

    let renderer = state.renderer();
    for (id, mime) in ids {
        println!("#{} ({})", id, mime);
        for (key, cell) in renderer.render_row(id, &session).await? {
            println!("  {:<16} {}", key, cell.to_html());
        }
    }
    Ok(())
}
