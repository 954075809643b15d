use chrono::Utc;
use futures::executor::block_on;
use gridview::{
    FileSnapshotFetcher, GraphModel, GridviewConfig, Monitor, Point, Snapshot, SnapshotFormat,
    SystemClock, TopologySession, TopologySummary, TopologyView,
};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Snapshot(gridview::FetchError),
    Config(gridview::Error),
    Model(gridview::ModelError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Snapshot(err) => write!(f, "{err}"),
            CliError::Config(err) => write!(f, "{err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<gridview::FetchError> for CliError {
    fn from(value: gridview::FetchError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<gridview::Error> for CliError {
    fn from(value: gridview::Error) -> Self {
        Self::Config(value)
    }
}

impl From<gridview::ModelError> for CliError {
    fn from(value: gridview::ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Replay,
    Watch,
}

#[derive(Debug, Clone)]
struct Drag {
    id: String,
    to: Point,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    inputs: Vec<String>,
    pretty: bool,
    config: Option<String>,
    interval_ms: Option<u64>,
    cycles: Option<usize>,
    drags: Vec<Drag>,
    select: Option<String>,
}

#[derive(Serialize)]
struct ModelOut<'a> {
    model: &'a GraphModel,
    summary: TopologySummary,
}

#[derive(Serialize)]
struct ReplayOut<'a> {
    steps: usize,
    model: &'a GraphModel,
    summary: TopologySummary,
}

#[derive(Serialize)]
struct CycleOut<'a> {
    cycle: usize,
    #[serde(flatten)]
    view: &'a TopologyView,
}

fn usage() -> &'static str {
    "gridview-cli\n\
\n\
USAGE:\n\
  gridview-cli [layout] [--pretty] [--config <path>] [<snapshot>|-]\n\
  gridview-cli replay [--pretty] [--config <path>] [--drag <id>=<x>,<y>]... [--select <id>] <snapshot>...\n\
  gridview-cli watch [--config <path>] [--interval <ms>] [--cycles <n>] <snapshot>\n\
\n\
NOTES:\n\
  - Snapshots ending in .yaml/.yml are read as YAML, everything else as JSON.\n\
  - If <snapshot> is omitted or '-', layout reads JSON from stdin.\n\
  - replay feeds the snapshots through one session in order; drags and the selection apply\n\
    after the first snapshot, so later snapshots show what survives a refresh.\n\
  - watch re-reads <snapshot> every interval and prints one JSON line per cycle.\n\
  - Set GRIDVIEW_LOG (e.g. GRIDVIEW_LOG=debug) to log to stderr.\n\
"
}

fn parse_drag(raw: &str) -> Option<Drag> {
    let (id, coords) = raw.rsplit_once('=')?;
    let (x, y) = coords.split_once(',')?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<f64>().ok()?;
    if id.is_empty() || !(x.is_finite() && y.is_finite()) {
        return None;
    }
    Some(Drag {
        id: id.to_string(),
        to: Point::new(x, y),
    })
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "replay" => args.command = Command::Replay,
            "watch" => args.command = Command::Watch,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--interval" => {
                let Some(ms) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let ms = ms.parse::<u64>().map_err(|_| CliError::Usage(usage()))?;
                if ms == 0 {
                    return Err(CliError::Usage(usage()));
                }
                args.interval_ms = Some(ms);
            }
            "--cycles" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.cycles = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--drag" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.drags.push(parse_drag(raw).ok_or(CliError::Usage(usage()))?);
            }
            "--select" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.select = Some(id.clone());
            }
            "--" => {
                args.inputs.extend(it.by_ref().cloned());
            }
            "-" => args.inputs.push("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => args.inputs.push(path.to_string()),
        }
    }

    let inputs_ok = match args.command {
        Command::Layout => args.inputs.len() <= 1,
        Command::Replay => !args.inputs.is_empty() && args.inputs.iter().all(|p| p != "-"),
        Command::Watch => args.inputs.len() == 1 && args.inputs[0] != "-",
    };
    if !inputs_ok {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_snapshot(input: Option<&str>) -> Result<Snapshot, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(SnapshotFormat::Json.parse(&buf)?)
        }
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(SnapshotFormat::from_path(Path::new(path)).parse(&text)?)
        }
    }
}

fn load_config(args: &Args) -> Result<GridviewConfig, CliError> {
    let mut config = match args.config.as_deref() {
        None => GridviewConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            match SnapshotFormat::from_path(Path::new(path)) {
                SnapshotFormat::Yaml => GridviewConfig::from_yaml_str(&text)?,
                SnapshotFormat::Json => GridviewConfig::from_json_str(&text)?,
            }
        }
    };
    if let Some(ms) = args.interval_ms {
        config.poll_interval_ms = ms;
    }
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run_layout(args: &Args, config: &GridviewConfig) -> Result<(), CliError> {
    let snapshot = read_snapshot(args.inputs.first().map(String::as_str))?;
    let mut session = TopologySession::new(config)?;
    let model = session.apply_snapshot(&snapshot, Utc::now());
    write_json(
        &ModelOut {
            model: &model,
            summary: model.summary(),
        },
        args.pretty,
    )
}

fn run_replay(args: &Args, config: &GridviewConfig) -> Result<(), CliError> {
    let mut session = TopologySession::new(config)?;
    for (step, path) in args.inputs.iter().enumerate() {
        let snapshot = read_snapshot(Some(path))?;
        let model = session.apply_snapshot(&snapshot, Utc::now());
        tracing::info!(step, path = %path, nodes = model.len(), "applied snapshot");
        if step == 0 {
            for drag in &args.drags {
                session.set_position(&drag.id, drag.to)?;
            }
            if let Some(id) = args.select.as_deref() {
                session.select_node(Some(id))?;
            }
        }
    }
    let model: Arc<GraphModel> = session.model();
    write_json(
        &ReplayOut {
            steps: args.inputs.len(),
            model: &model,
            summary: model.summary(),
        },
        args.pretty,
    )
}

fn run_watch(args: &Args, config: &GridviewConfig) -> Result<(), CliError> {
    let path = args.inputs.first().ok_or(CliError::Usage(usage()))?;
    let mut monitor = Monitor::new(FileSnapshotFetcher::new(path), SystemClock::new(), config)?;
    monitor.start();

    let mut cycle = 0usize;
    while args.cycles.is_none_or(|n| cycle < n) {
        if let Some(wait) = monitor.until_due() {
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        if let Some(view) = block_on(monitor.tick()) {
            cycle += 1;
            write_json(&CycleOut { cycle, view: &view }, false)?;
        }
    }
    monitor.stop();
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    match args.command {
        Command::Layout => run_layout(&args, &config),
        Command::Replay => run_replay(&args, &config),
        Command::Watch => run_watch(&args, &config),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("GRIDVIEW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
