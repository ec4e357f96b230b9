//! Trellis hello demo.
//!
//! Serves a handful of routes that show parameters, wildcards, groups with
//! their own middleware, form posts, and panic recovery.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use serde::Serialize;
use tracing::info;

use trellis::config::{ConfigLoader, TrellisConfig};
use trellis::prelude::*;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// Start from the development preset.
    dev: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut parsed = Self {
            config: None,
            dev: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    parsed.config = args.next().map(PathBuf::from);
                }
                "--dev" => parsed.dev = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        parsed
    }
}

fn print_help() {
    println!(
        r"Trellis hello demo

USAGE:
    trellis-hello [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
        --dev              Pretty debug logging on 127.0.0.1:9999
    -h, --help             Print help information

ENVIRONMENT VARIABLES:
    TRELLIS__SERVER__HTTP_ADDR     Bind address (default: 0.0.0.0:9999)
    TRELLIS__LOGGING__LEVEL        Log filter (default: info)
    TRELLIS__LOGGING__FORMAT       json or pretty
"
    );
}

#[derive(Serialize)]
struct Login<'a> {
    username: &'a str,
    password: &'a str,
}

fn load_config(args: &Args) -> anyhow::Result<TrellisConfig> {
    let loader = if args.dev {
        ConfigLoader::new().with_development()
    } else {
        ConfigLoader::new().with_defaults()
    };

    let loader = match &args.config {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => loader.with_optional_file("trellis.toml")?,
    };

    Ok(loader.with_env_prefix("TRELLIS").load()?)
}

/// Logs how long the `/v2` group's requests take, separately from the
/// engine-wide logger.
fn v2_timer() -> impl Fn(&mut Context<'_>) + Send + Sync + 'static {
    |ctx| {
        ctx.next();
        info!(
            "[{}] {} in {:?} for group v2",
            ctx.status_code().map_or(200, |s| s.as_u16()),
            ctx.path(),
            ctx.elapsed()
        );
    }
}

fn build_engine() -> RouteResult<Engine> {
    let mut engine = trellis::default_engine();

    engine
        .get("/", |ctx| ctx.html(StatusCode::OK, "<h1>Hello Trellis</h1>"))?
        .get("/panic", |ctx| {
            let names: Vec<&str> = ctx.path().split('/').collect();
            ctx.string(StatusCode::OK, names[100]);
        })?
        .get("/hello", |ctx| {
            let body = format!(
                "hello {}, you're at {}",
                ctx.query("name").unwrap_or_default(),
                ctx.path()
            );
            ctx.string(StatusCode::OK, body);
        })?
        .get("/hello/:name", |ctx| {
            let body = format!(
                "hello {}, you're at {}",
                ctx.param("name").unwrap_or_default(),
                ctx.path()
            );
            ctx.string(StatusCode::OK, body);
        })?
        .get("/assets/*filepath", |ctx| {
            let filepath = ctx.param("filepath").unwrap_or_default();
            let body = serde_json::json!({ "filepath": filepath });
            ctx.json(StatusCode::OK, &body);
        })?;

    {
        let mut v1 = engine.group("/v1");
        v1.get("/", |ctx| ctx.html(StatusCode::OK, "<h1>Hello Trellis v1</h1>"))?;
    }

    {
        let mut v2 = engine.group("/v2");
        v2.use_middleware(v2_timer());
        v2.get("/hello/:name", |ctx| {
            let body = format!(
                "hello {}, you're at {}",
                ctx.param("name").unwrap_or_default(),
                ctx.path()
            );
            ctx.string(StatusCode::OK, body);
        })?
        .post("/login", |ctx| {
            let username = ctx.post_form("username").unwrap_or_default();
            let password = ctx.post_form("password").unwrap_or_default();
            ctx.json(
                StatusCode::OK,
                &Login {
                    username: &username,
                    password: &password,
                },
            );
        })?;
    }

    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging(&config.logging.to_log_config())?;

    let engine = build_engine()?.seal();
    info!("Registered {} routes", engine.router().len());

    let server = Server::new(config.server.to_server_config(), Arc::new(engine));
    server.run().await?;

    Ok(())
}
