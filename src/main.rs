use clap::Parser;
use joypad_pool::config::Config;
use joypad_pool::devices::recording::RecordingBackend;
use joypad_pool::devices::uinput::UinputBackend;
use joypad_pool::logger::{self, Verbosity};
use joypad_pool::{ControllerPool, GamepadBackend, harness};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Virtual uinput joypads with a keyboard test loop")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of controllers (clamped to 1..=16)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    controllers: Option<i64>,

    /// Controller driven by the keyboard loop
    #[arg(short, long, default_value_t = 0)]
    target: usize,

    /// Record events in memory instead of opening /dev/uinput
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(n) = args.controllers {
        config.controllers = n;
    }
    // -vvv and beyond still mean High; only the config value can be out of range.
    let verbosity = Verbosity::from_u8(config.logging.verbosity.max(args.verbose.min(2)));
    logger::init(verbosity)?;

    info!("🚀 Iniciando joypad-pool...");

    if args.dry_run {
        let mut backend = RecordingBackend::new();
        let journal = backend.journal();
        drive(&mut backend, &config, args.target).await?;
        info!(
            created = journal.created().len(),
            events = journal.event_count(),
            destroyed = journal.destroyed().len(),
            "dry run finished"
        );
    } else {
        let mut backend = UinputBackend::new(config.axes.into());
        drive(&mut backend, &config, args.target).await?;
    }

    Ok(())
}

async fn drive<B: GamepadBackend>(backend: &mut B, config: &Config, target: usize) -> std::io::Result<()> {
    let mut pool = ControllerPool::start(backend, config.controllers);
    if pool.live_count() == 0 {
        warn!("no controllers could be created");
    }

    info!(controller = target, "Esperando teclas: p/r botón A, a/d/w/s ejes, z/x centrar, f/g/v/b gatillos");
    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = harness::run(stdin, &mut pool, target) => {
            let applied = result?;
            info!(applied, "stdin closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Apagando joypad-pool...");
        }
    }

    pool.reset_all();
    pool.shutdown();
    Ok(())
}
