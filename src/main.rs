use clap::{Parser, Subcommand};
use log::{Level, debug, info, log_enabled, warn};
use std::path::PathBuf;

use dispstore::{
    backend::{self, Backend, HyprctlBackend, WlrRandrBackend},
    mode::{DisplayMode, NewProfilePolicy, set_primary},
    settings::{BackendKind, Settings, default_store_path},
    store::Repository,
    types::{LiveMonitor, MonitorConfig},
};

#[derive(Parser, Debug)]
#[clap(
    name = "dispstore",
    version,
    about = "Remember monitor layouts per set of connected screens"
)]
pub struct Cli {
    #[clap(long)]
    #[arg(value_enum)]
    backend: Option<BackendType>,

    #[clap(long)]
    executable: Option<String>,

    /// Display configuration file
    #[clap(long)]
    store: Option<PathBuf>,

    /// Indent the saved configuration file
    #[clap(long)]
    pretty: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum BackendType {
    WlrRandr,
    Hyprctl,
}

impl From<BackendType> for BackendKind {
    fn from(value: BackendType) -> Self {
        match value {
            BackendType::WlrRandr => BackendKind::WlrRandr,
            BackendType::Hyprctl => BackendKind::Hyprctl,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display information on connected monitors
    Info,

    /// Print the stored configuration of the connected screen
    Show,

    /// Store the current layout in a display mode
    Record(RecordOptions),

    /// Print one stored monitor
    Get(GetOptions),

    /// Make one stored monitor the primary monitor of a display mode
    Primary(PrimaryOptions),

    /// Refresh stored output names from the connected monitors
    SyncNames,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeType {
    Custom,
    Mirror,
    Extend,
    OnlyOne,
}

#[derive(clap::Args, Debug)]
struct ModeOptions {
    #[arg(value_enum)]
    mode: ModeType,

    /// Custom profile name
    #[clap(long)]
    name: Option<String>,
}

impl ModeOptions {
    fn display_mode(&self) -> anyhow::Result<DisplayMode> {
        Ok(match self.mode {
            ModeType::Custom => match self.name {
                Some(ref name) => DisplayMode::Custom(name.clone()),
                None => return Err(anyhow::anyhow!("custom mode needs --name")),
            },
            ModeType::Mirror => DisplayMode::Mirror,
            ModeType::Extend => DisplayMode::Extend,
            ModeType::OnlyOne => DisplayMode::OnlyOne,
        })
    }
}

#[derive(Parser, Debug)]
struct RecordOptions {
    #[clap(flatten)]
    mode: ModeOptions,

    /// Keep other custom profiles when storing a new one
    #[clap(long)]
    keep_profiles: bool,

    /// UUID of the monitor to mark as primary
    #[clap(long)]
    primary: Option<String>,
}

#[derive(Parser, Debug)]
struct GetOptions {
    #[clap(flatten)]
    mode: ModeOptions,

    /// Look up the single-monitor entry
    #[clap(long)]
    single: bool,

    uuid: String,
}

#[derive(Parser, Debug)]
struct PrimaryOptions {
    #[clap(flatten)]
    mode: ModeOptions,

    uuid: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::read()?;
    debug!("Settings: {:?}", &settings);

    let executable = cli.executable.clone().or(settings.executable.clone());
    let backend: Box<dyn Backend> = match cli
        .backend
        .clone()
        .map(BackendKind::from)
        .or(settings.backend)
        .unwrap_or(BackendKind::WlrRandr)
    {
        BackendKind::WlrRandr => Box::new(WlrRandrBackend::new(
            executable
                .as_deref()
                .or(option_env!("STD_EXECUTABLE_WLR_RANDR"))
                .unwrap_or("wlr-randr")
                .to_string(),
        )),
        BackendKind::Hyprctl => Box::new(HyprctlBackend::new(
            executable
                .as_deref()
                .or(option_env!("STD_EXECUTABLE_HYPRCTL"))
                .unwrap_or("hyprctl")
                .to_string(),
        )),
    };

    let store_path = match cli.store.clone().or(settings.store.clone()) {
        Some(path) => path,
        None => default_store_path()?,
    };
    let pretty = cli.pretty || settings.pretty || log_enabled!(Level::Debug);

    let mut monitors = backend.get_live_monitors()?;
    monitors.sort_by(|a, b| a.name.cmp(&b.name));
    let screen_id = backend::screen_id(&monitors);
    let single = monitors.len() == 1;
    debug!("Screen {} with {} monitor(s)", screen_id, monitors.len());

    match cli.command {
        Commands::Info => {
            println!("{} connected monitors:", monitors.len());
            for mon in monitors.iter() {
                println!(
                    "* {}{}\n  UUID: {}\n  Make: {}\n  Model: {}\n  Serial: {}",
                    &mon.name,
                    if mon.enabled { "" } else { " [disabled]" },
                    &mon.uuid,
                    &mon.make,
                    &mon.model,
                    &mon.serial
                );
            }
            println!("Screen: {}", screen_id);
            println!("Configuration path: {}", store_path.display());
        }
        Commands::Show => {
            let repo = Repository::open_or_default(&store_path)?;
            match repo.screen(&screen_id) {
                Some(screen) => println!("{}", serde_json::to_string_pretty(screen)?),
                None => println!("No stored configuration for screen {}", screen_id),
            }
        }
        Commands::Record(ref opt) => {
            let mode = opt.mode.display_mode()?;
            let mut repo = Repository::open_or_default(&store_path)?;
            record(&mut repo, &screen_id, &monitors, &mode, opt);
            repo.commit(pretty)?;
        }
        Commands::Get(ref opt) => {
            let mode = opt.mode.display_mode()?;
            let repo = Repository::open(&store_path)?;
            let screen = repo.screen(&screen_id).ok_or_else(|| {
                anyhow::anyhow!("No stored configuration for screen {}", screen_id)
            })?;
            let Some(mon) = screen.monitor(opt.single || single, &mode, &opt.uuid) else {
                return Err(anyhow::anyhow!("Monitor {} not stored for {:?}", opt.uuid, mode));
            };
            println!("{}", serde_json::to_string_pretty(mon)?);
        }
        Commands::Primary(ref opt) => {
            let mode = opt.mode.display_mode()?;
            let mut repo = Repository::open(&store_path)?;
            if repo.screen(&screen_id).is_none() {
                return Err(anyhow::anyhow!(
                    "No stored configuration for screen {}",
                    screen_id
                ));
            }
            let Some(set) = repo.screen_mut(&screen_id).monitor_set_mut(&mode) else {
                return Err(anyhow::anyhow!("Nothing stored for {:?}", mode));
            };
            set_primary(set, &opt.uuid);
            if !set.iter().any(|m| m.primary) {
                warn!("{} is not part of {:?}, no primary monitor left", opt.uuid, mode);
            }
            repo.commit(pretty)?;
        }
        Commands::SyncNames => {
            let mut repo = Repository::open(&store_path)?;
            if repo.screen(&screen_id).is_none() {
                info!("No stored configuration for screen {}", screen_id);
                return Ok(());
            }
            let live = backend::live_monitor_map(monitors);
            repo.screen_mut(&screen_id).sync_names(&live);
            repo.commit(pretty)?;
        }
    }

    Ok(())
}

fn record(
    repo: &mut Repository,
    screen_id: &str,
    monitors: &[LiveMonitor],
    mode: &DisplayMode,
    opt: &RecordOptions,
) {
    let mut configs: Vec<MonitorConfig> = monitors.iter().map(MonitorConfig::from).collect();
    if let Some(ref uuid) = opt.primary {
        set_primary(&mut configs, uuid);
    }

    let screen = repo.screen_mut(screen_id);
    if let [mon] = configs.as_slice() {
        info!("Only one monitor connected, storing it as the single monitor");
        screen.single = Some(mon.clone());
        return;
    }

    let policy = if opt.keep_profiles {
        NewProfilePolicy::Append
    } else {
        NewProfilePolicy::ReplaceAll
    };
    debug!("Recording {} monitor(s) for {:?}", configs.len(), mode);
    screen.set_monitor_set_with(mode, configs, policy);
}
