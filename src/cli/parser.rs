use crate::core::views::SiteSort;
use crate::export::{ExportFormat, ExportKind};
use crate::models::client_type::ClientType;
use crate::models::extra::ExtraStatus;
use crate::models::intervention::InterventionStatus;
use crate::models::intervention_type::InterventionType;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rChantier
/// CLI application to track landscaping job sites with SQLite
#[derive(Parser)]
#[command(
    name = "rchantier",
    version = env!("CARGO_PKG_VERSION"),
    about = "Landscaping job-site tracker: mowing, trimming and weeding urgency, visit timer and extras, on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration file for missing or invalid fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing configuration fields with default values")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "last", value_name = "N", help = "Only the N most recent rows")]
        last: Option<usize>,
    },

    /// Manage job sites
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Record and list interventions (visits)
    Visit {
        #[command(subcommand)]
        action: VisitAction,
    },

    /// Plan weeding passes
    Weeding {
        #[command(subcommand)]
        action: WeedingAction,
    },

    /// Off-contract billable work
    Extra {
        #[command(subcommand)]
        action: ExtraAction,
    },

    /// Time a visit with a live stopwatch
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Export sites, visits or extras
    Export {
        #[arg(long, value_enum, default_value = "visits")]
        what: ExportKind,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(
            long,
            value_name = "FILE",
            help = "Output file (default: ./<what>-<date>.<ext>, PDF into the attachments folder)"
        )]
        file: Option<String>,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter by year/month/day or a custom range (YYYY-MM:YYYY-MM)"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Zip the database, attachments and configuration
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f', help = "Overwrite an existing archive")]
        force: bool,
    },

    /// Replace the current data with a backup archive
    Restore {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

/// Coordinates and geocoding switches shared by `site add` and `site edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlacementArgs {
    #[arg(long, requires = "lon", allow_hyphen_values = true, help = "Latitude (-90..90)")]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true, help = "Longitude (-180..180)")]
    pub lon: Option<f64>,

    #[arg(long = "no-geocode", conflicts_with = "lat", help = "Do not look the address up")]
    pub no_geocode: bool,
}

#[derive(Subcommand)]
pub enum SiteAction {
    /// Add a job site
    Add {
        /// Client name
        client: String,

        #[arg(long)]
        address: String,

        #[arg(long = "type", value_enum, default_value = "residential")]
        client_type: ClientType,

        #[arg(long, value_enum, value_delimiter = ',', help = "Active services (default: all)")]
        services: Option<Vec<InterventionType>>,

        #[command(flatten)]
        placement: PlacementArgs,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Change fields of a job site
    Edit {
        id: i64,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long = "type", value_enum)]
        client_type: Option<ClientType>,

        #[arg(long, value_enum, value_delimiter = ',')]
        services: Option<Vec<InterventionType>>,

        #[command(flatten)]
        placement: PlacementArgs,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show one site with its urgency and recent visits
    Show { id: i64 },

    /// List sites by urgency
    List {
        #[arg(long, short, help = "Match client name or address")]
        search: Option<String>,

        #[arg(long, value_enum, default_value = "urgency")]
        sort: SiteSort,

        #[arg(long, value_enum, help = "Only sites with this service, judged on it alone")]
        service: Option<InterventionType>,

        #[arg(long, short = 'u', help = "Hide sites that are up to date")]
        urgent: bool,
    },

    /// Delete a site with its visits and plans
    Del {
        id: i64,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum VisitAction {
    /// Record a completed visit
    Add {
        /// Job site id
        site: i64,

        #[arg(long = "type", value_enum)]
        kind: InterventionType,

        #[arg(long, help = "Visit date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "in", help = "Start time (HH:MM)")]
        start: Option<String>,

        #[arg(long = "out", help = "End time (HH:MM)")]
        end: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List visits
    List {
        #[arg(long)]
        site: Option<i64>,

        #[arg(long = "type", value_enum)]
        kind: Option<InterventionType>,

        #[arg(long, value_enum)]
        status: Option<InterventionStatus>,

        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,
    },

    /// Complete a visit left in progress by an interrupted timer
    Finish {
        id: i64,

        #[arg(long = "out", help = "End time (HH:MM, default now)")]
        end: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a visit
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum WeedingAction {
    /// Plan a weeding pass
    Plan {
        /// Job site id
        site: i64,

        #[arg(long, help = "Planned date (YYYY-MM-DD)")]
        date: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List planned passes, late ones first
    List {
        #[arg(long, help = "Hide passes already done")]
        pending: bool,
    },

    /// Mark a pass done and log the weeding visit
    Done {
        id: i64,

        #[arg(long, help = "Date of the visit (YYYY-MM-DD, default today)")]
        date: Option<String>,
    },

    /// Delete a planned pass
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum ExtraAction {
    /// Record off-contract work
    Add {
        #[arg(long, help = "Job site id")]
        site: Option<i64>,

        #[arg(long, help = "Free-text client when there is no job site")]
        client: Option<String>,

        #[arg(long = "desc")]
        description: String,

        #[arg(long, allow_hyphen_values = true)]
        amount: f64,

        #[arg(long, help = "Date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark an extra as invoiced
    Invoice { id: i64 },

    /// List extras with the total left to invoice
    List {
        #[arg(long, value_enum)]
        status: Option<ExtraStatus>,

        #[arg(long)]
        site: Option<i64>,
    },

    /// Delete an extra
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the stopwatch; Enter or Ctrl-C stops it
    Start {
        #[arg(long)]
        site: i64,

        #[arg(long = "type", value_enum)]
        kind: InterventionType,
    },

    /// Show visits still in progress
    Status,
}
