use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tp", about = concat!("taskpad v", env!("CARGO_PKG_VERSION"), " - tasks in categories, from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// List the tasks in a view (all, completed, or a category)
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Edit a task
    Edit(EditArgs),
    /// Toggle a task between done and not done
    Done(IdArgs),
    /// Delete a task
    Rm(IdArgs),
    /// Drop a task onto another task's position within a view
    Mv(MvArgs),
    /// Category management
    Category(CategoryCmd),
    /// Show or change the color theme
    Theme(ThemeArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Category id or name
    #[arg(short, long)]
    pub category: Option<String>,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// View: all, completed, or a category id/name
    #[arg(default_value = "all")]
    pub view: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id (or unique prefix)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Category id or name
    #[arg(short, long)]
    pub category: Option<String>,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task being dragged
    pub dragged: String,
    /// Task it is dropped onto
    pub target: String,
    /// View the drag happens in (all, completed, or a category)
    #[arg(long, default_value = "all")]
    pub view: String,
}

// ---------------------------------------------------------------------------
// Category args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories with their open task counts
    List,
    /// Add a category
    Add {
        name: String,
        /// Hex color, e.g. #10B981
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a category
    Edit {
        /// Category id or name
        category: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category that no task uses
    Rm {
        /// Category id or name
        category: String,
    },
}

// ---------------------------------------------------------------------------
// Misc args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// toggle, light or dark (omit to show the current theme)
    pub mode: Option<String>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
}
