use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitquest", version, about = "HabitQuest CLI")]
struct Cli {
    /// Act as this user (defaults to identity.user_id from config)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Campaign administration
    Campaign {
        #[command(subcommand)]
        action: commands::campaign::CampaignAction,
    },
    /// Join a published campaign
    Join {
        /// Campaign ID
        campaign_id: String,
        /// Disable reminders for this participation
        #[arg(long)]
        no_notifications: bool,
    },
    /// Participation queries and lifecycle
    Participation {
        #[command(subcommand)]
        action: commands::participation::ParticipationAction,
    },
    /// Daily check-ins
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Reward tickets
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config_level: &str) {
    let filter = EnvFilter::try_from_env("HABITQUEST_LOG")
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr; stdout carries JSON only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::CmdResult {
    let command = match cli.command {
        // Stays usable with a broken config.toml so `config reset` can repair it.
        Commands::Config { action } => {
            init_tracing("warn");
            return commands::config::run(action);
        }
        other => other,
    };
    let ctx = commands::Context::load(cli.user, cli.today)?;
    init_tracing(&ctx.config.logging.level);

    match command {
        Commands::Campaign { action } => commands::campaign::run(action, &ctx),
        Commands::Join {
            campaign_id,
            no_notifications,
        } => commands::participation::join(&campaign_id, no_notifications, &ctx),
        Commands::Participation { action } => commands::participation::run(action, &ctx),
        Commands::Checkin { action } => commands::checkin::run(action, &ctx),
        Commands::Reward { action } => commands::reward::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action),
    }
}
