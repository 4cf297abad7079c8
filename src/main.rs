use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::try_join_all;
use serde_json::Value;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tupi::config::Config;
use tupi::{generate_url, DataClient, DirectClient, InsertRequest};

/// Client for spreadsheet-backed Apps Script deployments
#[derive(Parser, Debug)]
#[command(name = "tupi", version, about, long_about = None)]
struct Args {
    /// Apps Script deployment id (falls back to DEPLOYMENT_ID, then the config file)
    #[arg(long, global = true)]
    deployment_id: Option<String>,

    /// Base URL for direct calls (falls back to DATA_URL)
    #[arg(long, global = true)]
    data_url: Option<String>,

    /// Secret header value for direct calls (falls back to DATA_SECRET)
    #[arg(long, global = true)]
    data_secret: Option<String>,

    /// Call DATA_URL with the Secret header instead of the deployment URL
    #[arg(long, global = true)]
    direct: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Remember the deployment id in the config file
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List records
    List {
        /// Sheet to list (required with --direct)
        #[arg(short, long)]
        sheet: Option<String>,
    },
    /// Insert one or more records
    Insert {
        #[arg(short, long)]
        sheet: String,
        /// Record as a JSON object; repeat to insert several records
        #[arg(short, long = "data", required = true)]
        data: Vec<String>,
    },
    /// Delete a record by row number
    Delete {
        #[arg(short, long)]
        sheet: String,
        #[arg(short, long)]
        row: u64,
    },
    /// Print the execution URL for an API name
    Url {
        api: String,
        /// Extra query parameter as key=value
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", log_path.display());
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tupi started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tupi").join("tupi.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tupi").join("tupi.log");
    }
    PathBuf::from("tupi.log")
}

/// Whichever client the flags selected
enum Backend {
    Script(DataClient),
    Direct(DirectClient),
}

impl Backend {
    fn from_args(args: &Args, config: &mut Config) -> Result<Self> {
        if args.direct {
            let (url, secret) = direct_settings(args, config)?;
            return Ok(Backend::Direct(DirectClient::new(&url, &secret)?));
        }

        let deployment_id = resolve_deployment_id(args, config)?;
        Ok(Backend::Script(DataClient::new(&deployment_id)?))
    }

    async fn list(&self, sheet: Option<&str>) -> Result<Value> {
        match self {
            Backend::Script(client) => match sheet {
                Some(sheet) => client.list_with(&[("sheet", sheet)]).await,
                None => client.list().await,
            },
            Backend::Direct(client) => {
                let sheet = sheet.context("--sheet is required with --direct")?;
                client.list(sheet).await
            }
        }
    }

    async fn insert(&self, request: &InsertRequest) -> Result<Value> {
        match self {
            Backend::Script(client) => client.insert(request).await,
            Backend::Direct(client) => client.insert(request).await,
        }
    }

    async fn delete(&self, sheet: &str, row: u64) -> Result<Value> {
        match self {
            Backend::Script(client) => client.delete(sheet, row).await,
            Backend::Direct(client) => client.delete(sheet, row).await,
        }
    }
}

/// Base URL and secret for the direct client; both are required
fn direct_settings(args: &Args, config: &Config) -> Result<(String, String)> {
    let url = config
        .effective_data_url(args.data_url.as_deref())
        .ok_or_else(|| anyhow!("Missing DATA_URL"))?;
    let secret = config
        .effective_data_secret(args.data_secret.as_deref())
        .ok_or_else(|| anyhow!("Missing DATA_SECRET"))?;
    Ok((url, secret))
}

fn resolve_deployment_id(args: &Args, config: &mut Config) -> Result<String> {
    let deployment_id = config
        .effective_deployment_id(args.deployment_id.as_deref())
        .ok_or_else(|| anyhow!("Missing DEPLOYMENT_ID"))?;

    if args.save && config.deployment_id.as_deref() != Some(deployment_id.as_str()) {
        config
            .set_deployment_id(&deployment_id)
            .context("Failed to save config")?;
        tracing::info!("Saved deployment id to config");
    }

    Ok(deployment_id)
}

async fn run(args: &Args, config: &mut Config) -> Result<Value> {
    match &args.command {
        Command::Url { api, params } => {
            let deployment_id = resolve_deployment_id(args, config)?;
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let url = generate_url(&deployment_id, api, &pairs)?;
            Ok(Value::String(url.into()))
        }
        Command::List { sheet } => {
            let backend = Backend::from_args(args, config)?;
            backend.list(sheet.as_deref()).await
        }
        Command::Insert { sheet, data } => {
            let requests = data
                .iter()
                .map(|raw| {
                    let record: Value = serde_json::from_str(raw)
                        .with_context(|| format!("Invalid JSON record: {raw}"))?;
                    Ok(InsertRequest::new(sheet, record))
                })
                .collect::<Result<Vec<_>>>()?;

            let backend = Backend::from_args(args, config)?;
            tracing::info!("Inserting {} record(s) into {}", requests.len(), sheet);

            let mut responses = try_join_all(requests.iter().map(|r| backend.insert(r))).await?;
            if responses.len() == 1 {
                Ok(responses.remove(0))
            } else {
                Ok(Value::Array(responses))
            }
        }
        Command::Delete { sheet, row } => {
            let backend = Backend::from_args(args, config)?;
            backend.delete(sheet, *row).await
        }
    }
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match (value, format) {
        (Value::String(s), _) => Ok(s.clone()),
        (_, OutputFormat::Json) => Ok(serde_json::to_string_pretty(value)?),
        (_, OutputFormat::Yaml) => Ok(serde_yaml::to_string(value)?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();

    let value = run(&args, &mut config).await?;
    println!("{}", render(&value, args.output)?.trim_end());

    Ok(())
}
