use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use carousel_components::CarouselArgs;
use clap::Parser;

mod session;

#[derive(Parser)]
#[command(name = "carousel-demo")]
#[command(version, about = "Drive a headless carousel through a scripted session", long_about = None)]
struct Cli {
    /// JSON file with carousel args; flags below are ignored when given
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of items
    #[arg(short = 'n', long, default_value_t = 5)]
    items: usize,
    /// Stop at the first and last item instead of wrapping
    #[arg(long)]
    no_loop: bool,
    /// Advance pages automatically
    #[arg(long)]
    auto_play: bool,
    /// Walk backwards when autoplaying
    #[arg(long)]
    reverse: bool,
    /// Run on the wall clock with a timer thread instead of simulated time
    #[arg(long)]
    realtime: bool,
    /// Length of the session in seconds
    #[arg(short, long, default_value_t = 12)]
    seconds: u64,
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(
            "error,carousel_components=debug,carousel_ui=info,carousel_demo=info",
        ) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn load_args(cli: &Cli) -> Result<CarouselArgs> {
    if let Some(path) = &cli.config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return CarouselArgs::from_json(&json)
            .with_context(|| format!("invalid carousel config in {}", path.display()));
    }
    let args = CarouselArgs::default()
        .data_length(cli.items)
        .item_width(300.0)
        .spacing(16.0)
        .container_width(360.0)
        .looping(!cli.no_loop)
        .auto_play(cli.auto_play)
        .auto_play_reverse(cli.reverse);
    args.validate()?;
    Ok(args)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let args = load_args(&cli)?;
    let session = session::Session::new(args, cli.seconds);
    if cli.realtime {
        session.run_realtime()
    } else {
        session.run_simulated()
    }
}
