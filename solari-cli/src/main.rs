use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solari_cli::{commands, LinkOptions};
use solari_core::{dispatcher::EchoOptions, Side};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "solari")]
#[command(
    about = "Solari - Control split-flap platform panels over a serial line",
    long_about = None,
    after_help = "Serial devices must already be configured to 115200 baud 8N1 raw, e.g.\n  \
                  stty -F /dev/ttyUSB0 115200 cs8 -parenb -cstopb raw"
)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print received positions
    #[arg(short, long, global = true)]
    pos: bool,

    /// Print received sensors
    #[arg(short, long, global = true)]
    sens: bool,

    /// Print received target
    #[arg(short, long, global = true)]
    target: bool,

    /// Installation profile (JSON); defaults to the built-in 26-unit panel
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show content on one side of the panel
    SetPositions {
        /// Content JSON file (stdin when omitted)
        #[arg(long)]
        file: Option<String>,

        /// Wait until the panel reports the new positions
        #[arg(short, long)]
        wait: bool,

        /// Serial device, preconfigured to 115200 baud 8N1 raw (see stty)
        device: String,

        /// Side: A or B
        side: Side,
    },

    /// Blank every unit of one side
    Reset {
        /// Wait until the panel reports blank positions
        #[arg(short, long)]
        wait: bool,

        /// Serial device, preconfigured to 115200 baud 8N1 raw (see stty)
        device: String,

        /// Side: A or B
        side: Side,
    },

    /// Advance a single unit by one flap
    Flap {
        /// Serial device, preconfigured to 115200 baud 8N1 raw (see stty)
        device: String,

        /// Unit index
        flapid: usize,

        /// Side: A or B
        side: Side,
    },

    /// Print current and target state of a side
    State {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Serial device, preconfigured to 115200 baud 8N1 raw (see stty)
        device: String,

        /// Side: A or B (first reporting side when omitted)
        side: Option<Side>,
    },

    /// Watch panel traffic until interrupted
    Loop {
        /// Seconds between traffic summaries
        #[arg(long, default_value = "10")]
        summary_secs: u64,

        /// Serial device, preconfigured to 115200 baud 8N1 raw (see stty)
        device: String,

        /// Side: A or B (both when omitted)
        side: Option<Side>,
    },

    /// Encode content offline and print the unit codes
    Encode {
        /// Content JSON file (stdin when omitted)
        #[arg(long)]
        file: Option<String>,

        /// Also print the SET_ALL frame for this side
        #[arg(long)]
        frame: Option<Side>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&cli.log_level)
            .with_context(|| format!("Invalid log level: {}", cli.log_level))?
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let profile = commands::load_profile(cli.profile.as_deref())?;

    let link = LinkOptions {
        profile,
        echo: EchoOptions {
            positions: cli.pos,
            sensors: cli.sens,
            target: cli.target,
        },
    };

    // Execute command
    match cli.command {
        Commands::SetPositions {
            file,
            wait,
            device,
            side,
        } => {
            let content = commands::load_content(file.as_deref())?;
            commands::set::execute(&link, &device, side, &content, wait)
        }

        Commands::Reset { wait, device, side } => commands::set::reset(&link, &device, side, wait),

        Commands::Flap {
            device,
            flapid,
            side,
        } => commands::flap::execute(&link, &device, flapid, side),

        Commands::State { json, device, side } => {
            commands::state::execute(&link, &device, side, json)
        }

        Commands::Loop {
            summary_secs,
            device,
            side,
        } => commands::monitor::execute(&link, &device, side, summary_secs),

        Commands::Encode { file, frame } => {
            let content = commands::load_content(file.as_deref())?;
            commands::encode::execute(&link.profile, &content, frame)
        }
    }
}
