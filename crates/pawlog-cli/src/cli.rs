use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pawlog")]
#[command(about = "Track your pets' weight, body condition, and vet visits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name for Supabase configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, add, and inspect pets
    Pets {
        #[command(subcommand)]
        command: PetsCommands,
    },
    /// Record a new observation for a pet
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PetsCommands {
    /// List your pets, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a new pet
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        species: String,
        #[arg(long)]
        breed: Option<String>,
        /// Age in years (free text is accepted)
        #[arg(long)]
        age: String,
    },
    /// Show one pet and a tab of its logs
    Show {
        /// Pet ID
        id: String,
        /// Log tab to display
        #[arg(long, value_enum, default_value_t = LogTab::Weight)]
        tab: LogTab,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// Record a weight (stored as entered)
    Weight {
        /// Pet ID
        pet: String,
        /// Weight in kg
        weight: String,
        /// Observation date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Record a body condition
    Body {
        /// Pet ID
        pet: String,
        /// One of: very-thin, underweight, ideal, overweight, obese (or 1-5)
        condition: Option<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Record vet visit notes
    Vet {
        /// Pet ID
        pet: String,
        /// Visit notes
        notes: Vec<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogTab {
    Weight,
    Body,
    Vet,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
        /// Retries for failed reads
        #[arg(long, value_name = "COUNT")]
        read_retries: Option<u32>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with Supabase email/password and store session in keychain
    Login {
        /// Supabase account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Supabase account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create a Supabase account
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status,
    /// Sign out profile and clear stored session
    Logout,
}
