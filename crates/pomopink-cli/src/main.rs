use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod bell;
mod commands;

#[derive(Parser)]
#[command(name = "pomopink-cli", version, about = "Pomopink CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a countdown in the foreground
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Today's pomodoro and focus counters
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Habit trackers and their wins
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Task checklist
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Free-form notes
    Notes {
        #[command(subcommand)]
        action: commands::notes::NotesAction,
    },
    /// Ask for a motivational caption
    Cheer,
    /// Mute or unmute audio cues (toggles when no state is given)
    Mute {
        #[arg(value_parser = ["on", "off"])]
        state: Option<String>,
    },
    /// Print today's summary as JSON
    Summary,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Notes { action } => commands::notes::run(action),
        Commands::Cheer => commands::cheer::run(),
        Commands::Mute { state } => commands::mute::run(state.as_deref()),
        Commands::Summary => commands::summary::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomopink-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
