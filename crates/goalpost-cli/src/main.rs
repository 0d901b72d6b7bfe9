//! goalpost CLI.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use goalpost_gateway::mock::{DEMO_EMAIL, DEMO_PASSWORD};

mod commands;

#[derive(Parser)]
#[command(name = "goalpost", version, about = "Track progress on personal goals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that talks to the gateway.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Account email
    #[arg(long, default_value = DEMO_EMAIL)]
    pub email: String,

    /// Account password
    #[arg(long, default_value = DEMO_PASSWORD)]
    pub password: String,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the progress summary
    Summary {
        #[command(flatten)]
        session: SessionArgs,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List goals
    Goals {
        #[command(flatten)]
        session: SessionArgs,

        /// Only goals whose title or description contains this text
        #[arg(long)]
        search: Option<String>,

        /// Only goals in this category
        #[arg(long)]
        category: Option<String>,

        /// Only the first N goals
        #[arg(long)]
        recent: Option<usize>,
    },

    /// Set progress on one or more goals (e.g. "goal-3=20")
    Update {
        #[command(flatten)]
        session: SessionArgs,

        /// GOAL_ID=VALUE pairs
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Create a goal
    Add {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Value at which the goal is complete
        #[arg(long)]
        target: f64,

        /// Progress so far
        #[arg(long, default_value = "0")]
        current: f64,

        #[arg(long, default_value = "")]
        unit: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        #[arg(long, default_value = "Personal")]
        category: String,

        #[arg(long, default_value = "#6B7280")]
        color: String,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goalpost=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary { session, format } => commands::summary::execute(session, format).await,
        Commands::Goals {
            session,
            search,
            category,
            recent,
        } => commands::goals::execute(session, search, category, recent).await,
        Commands::Update {
            session,
            assignments,
        } => commands::update::execute(session, assignments).await,
        Commands::Add {
            session,
            title,
            description,
            target,
            current,
            unit,
            start,
            end,
            category,
            color,
        } => {
            let new_goal = goalpost_core::NewGoal {
                title,
                description,
                target_value: target,
                current_value: current,
                unit,
                start_date: start,
                end_date: end,
                category,
                color,
            };
            commands::add::execute(session, new_goal).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
