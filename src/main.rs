use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use situ::cli::{analytics, chat, goal, init, note, preset, profile, rec, resolve, streaks, tag};
use situ::config::Config;
use situ::store::Store;
use situ::webhook::Dispatcher;

#[derive(Parser)]
#[command(name = "situ")]
#[command(about = "Context-aware life tracking: situations, streaks, goals, automation webhooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "situ.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the base tag registry (groups, weekdays, day periods, devices)
    Init,

    /// Tag registry management
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Resolve a tag selection to its canonical context
    Resolve {
        /// Tag ids, comma separated
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<i64>,

        /// Resolve a saved preset by name instead
        #[arg(short, long)]
        preset: Option<String>,

        /// Mix smart defaults (weekday, day period, device) into the selection
        #[arg(long)]
        smart: bool,

        /// Device hint for smart defaults
        #[arg(long, default_value = "laptop")]
        device: String,
    },

    /// Notes attached to a context
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// Goal management
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Quick-access tag bundles
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Chat with the automation peer
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Consecutive-day streaks per tag
    Streaks {
        /// Lookback window in days
        #[arg(short, long, default_value_t = 30)]
        days: i64,

        /// Tag groups to scan, comma separated
        #[arg(short, long, value_delimiter = ',', default_values_t = vec!["Place".to_string(), "Activity".to_string()])]
        groups: Vec<String>,
    },

    /// Points and badges
    Profile,

    /// Achievement reports
    Analytics,

    /// AI recommendations for a context
    Rec {
        #[command(subcommand)]
        command: RecCommands,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Create a tag group
    AddGroup { name: String },
    /// Create a category within a group
    AddCategory { group: String, name: String },
    /// Create a tag
    Add {
        /// Group name (created if missing)
        group: String,
        /// Tag name
        name: String,
        /// Category within the group
        #[arg(long)]
        category: Option<String>,
        /// Icon name (e.g. 'fa-home')
        #[arg(long)]
        icon: Option<String>,
    },
    /// List all tags
    List,
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Attach a note to the context resolved from --tags
    Add {
        title: String,
        content: String,
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<i64>,
    },
    /// List notes of the context resolved from --tags
    List {
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Create a goal, optionally linked to a tag or a context
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// 1 Low, 2 Medium, 3 High, 4 Critical
        #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(i64).range(1..=4))]
        importance: i64,
        #[arg(long, conflicts_with = "context")]
        tag: Option<i64>,
        #[arg(long)]
        context: Option<i64>,
        /// Deadline, RFC 3339
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List goals
    List {
        /// Include completed goals
        #[arg(long)]
        all: bool,
    },
    /// Complete a goal and mint its achievement
    Done {
        goal_id: i64,
        /// What did checking this off feel like?
        #[arg(long)]
        reflection: Option<String>,
    },
}

#[derive(Subcommand)]
enum PresetCommands {
    /// Save a tag bundle under a name
    Add {
        name: String,
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<i64>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List presets
    List,
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Send a message (a new session is opened when none is given)
    Send {
        message: String,
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Show a session's history
    History {
        #[arg(short, long)]
        session: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum RecCommands {
    /// Record a recommendation for a context
    Add {
        context_id: i64,
        title: String,
        recommendation: String,
        #[arg(long)]
        summary: Option<String>,
        /// 1 Low, 2 Medium, 3 High
        #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(i64).range(1..=3))]
        priority: i64,
    },
    /// List recommendations
    List {
        #[arg(long)]
        context: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("situ=info")),
        )
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_default();

    // Initialize store and dispatcher
    let store = Arc::new(Store::open(&config.database_path())?);
    let dispatcher = Dispatcher::new(config.webhook.clone(), store.clone());

    let result = run_command(cli.command, &store, &dispatcher);

    // Drain in-flight webhook deliveries before exit; the user's action
    // already succeeded either way
    dispatcher.shutdown().await;

    result
}

fn run_command(command: Commands, store: &Store, dispatcher: &Dispatcher) -> Result<()> {
    match command {
        Commands::Init => init::run(store),
        Commands::Tag { command } => match command {
            TagCommands::AddGroup { name } => tag::add_group(store, name),
            TagCommands::AddCategory { group, name } => tag::add_category(store, group, name),
            TagCommands::Add {
                group,
                name,
                category,
                icon,
            } => tag::add(store, group, category, name, icon),
            TagCommands::List => tag::list(store),
        },
        Commands::Resolve {
            tags,
            preset,
            smart,
            device,
        } => resolve::run(store, dispatcher, tags, preset, smart, device),
        Commands::Note { command } => match command {
            NoteCommands::Add {
                title,
                content,
                tags,
            } => note::add(store, dispatcher, title, content, tags),
            NoteCommands::List { tags } => note::list(store, tags),
        },
        Commands::Goal { command } => match command {
            GoalCommands::Add {
                title,
                description,
                importance,
                tag,
                context,
                deadline,
            } => goal::add(
                store, dispatcher, title, description, importance, tag, context, deadline,
            ),
            GoalCommands::List { all } => goal::list(store, all),
            GoalCommands::Done {
                goal_id,
                reflection,
            } => goal::done(store, dispatcher, goal_id, reflection),
        },
        Commands::Preset { command } => match command {
            PresetCommands::Add { name, tags, icon } => preset::add(store, name, icon, tags),
            PresetCommands::List => preset::list(store),
        },
        Commands::Chat { command } => match command {
            ChatCommands::Send { message, session } => {
                chat::send(store, dispatcher, session, message)
            }
            ChatCommands::History { session, limit } => chat::history(store, session, limit),
        },
        Commands::Streaks { days, groups } => streaks::run(store, days, groups),
        Commands::Profile => profile::run(store),
        Commands::Analytics => analytics::run(store),
        Commands::Rec { command } => match command {
            RecCommands::Add {
                context_id,
                title,
                recommendation,
                summary,
                priority,
            } => rec::add(store, context_id, title, summary, recommendation, priority),
            RecCommands::List { context } => rec::list(store, context),
        },
    }
}
