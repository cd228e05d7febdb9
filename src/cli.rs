// Command line definition. Parsing only; `main` does the dispatching.

use clap::{Args, Parser, Subcommand};
use hopla::tasks::Difficulty;
use hopla::user::{AuthInfo, InventoryGroup, Stat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hopla",
    about = "hopla - a command line interface (CLI) to interact with habitica.com",
    version
)]
pub struct Cli {
    /// Path to the configuration file [default: ~/.config/hopla/config.toml]
    #[arg(long, env = "HOPLA_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add tasks and checklist items
    #[command(subcommand)]
    Add(AddCommand),

    /// Get information from habitica
    #[command(subcommand)]
    Get(GetCommand),

    /// Check whether the habitica API is up
    Status,
}

#[derive(Subcommand)]
pub enum AddCommand {
    /// Add a To-Do, optionally with a checklist read from a file
    Todo {
        /// Text of the To-Do
        #[arg(required = true)]
        text: Vec<String>,
        /// Absolute path of a file with one checklist item per line
        #[arg(short, long)]
        checklist: Option<PathBuf>,
        /// Due date (YYYY-MM-DD)
        #[arg(short = 'd', long)]
        due_date: Option<String>,
        /// Difficulty of the To-Do
        #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
        /// Extra notes shown under the To-Do
        #[arg(short, long)]
        notes: Option<String>,
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Add checklist items from a file to an existing To-Do
    Checklist {
        /// Id of the To-Do
        todo_id: String,
        /// Absolute path of a file with one checklist item per line
        file: PathBuf,
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args)]
pub struct BatchArgs {
    /// Do not ask for confirmation on long checklists
    #[arg(short, long)]
    pub yes: bool,
    /// Requests allowed per window (overrides config)
    #[arg(long)]
    pub max_requests: Option<u32>,
    /// Length of the rate limit window in seconds (overrides config)
    #[arg(long)]
    pub window_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum GetCommand {
    /// Return user information, optionally filtered
    UserInfo {
        /// Comma separated list of dotted keys, e.g. "items.mounts,achievements.streak"
        #[arg(short, long = "filter", value_name = "FILTER_STRING")]
        filter: Option<String>,
    },

    /// Return the user's stats (health, mana, experience, gold, level, class)
    UserStats {
        /// Single stat to show
        #[arg(value_enum, default_value_t = Stat::All)]
        stat: Stat,
    },

    /// Return the user's inventory (pets, mounts, eggs, food, gear, ...)
    UserInventory {
        /// Single inventory group to show
        #[arg(value_enum, default_value_t = InventoryGroup::All)]
        group: InventoryGroup,
    },

    /// Return the user's username, email or profile name
    UserAuth {
        /// Single detail to show
        #[arg(value_enum, default_value_t = AuthInfo::All)]
        info: AuthInfo,
    },
}
