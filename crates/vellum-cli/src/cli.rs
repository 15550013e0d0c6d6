use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Work with Vellum documents, folders and smart views from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Workspace name (created on first use when omitted)
    #[arg(long, global = true, value_name = "NAME")]
    pub workspace: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new document
    #[command(alias = "new")]
    Add {
        /// Document title
        title: String,
        /// Document content
        content: Vec<String>,
        /// Folder pathname to file the document under
        #[arg(long, value_name = "PATHNAME")]
        folder: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// List documents
    List {
        /// Number of documents to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only documents directly in this folder
        #[arg(long, value_name = "PATHNAME")]
        folder: Option<String>,
        /// Only documents carrying this tag
        #[arg(long, value_name = "TAG")]
        tag: Option<String>,
        /// Only bookmarked documents
        #[arg(long)]
        bookmarked: bool,
        /// Filter through a saved smart view
        #[arg(long, value_name = "NAME")]
        view: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bookmark a document (or clear the bookmark)
    Bookmark {
        /// Document ID or unique ID prefix
        id: String,
        /// Clear the bookmark instead of setting it
        #[arg(long)]
        remove: bool,
        /// Also push the change to the cloud API for this team
        #[arg(long, value_name = "TEAM_ID")]
        team: Option<String>,
    },
    /// Manage saved smart views
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },
    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },
    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },
    /// Export documents
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
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
    /// Pull the local replica up to date with the remote store
    Sync,
}

#[derive(Subcommand)]
pub enum ViewCommands {
    /// Save a new smart view
    Add {
        /// View name
        name: String,
        /// Condition as inline JSON, or @path to a JSON file
        #[arg(long, value_name = "JSON|@FILE")]
        condition: String,
    },
    /// List saved smart views
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a saved smart view
    Remove {
        /// View name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum FolderCommands {
    /// Create a folder (missing parents are created too)
    Add {
        /// Absolute folder pathname, e.g. /projects/alpha
        pathname: String,
    },
    /// Show the folder tree
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename or move a single folder
    Rename {
        /// Current pathname
        old: String,
        /// New pathname
        new: String,
        /// Also move descendant folders and their documents
        #[arg(long)]
        recursive: bool,
    },
    /// Apply an edited folder tree from a JSON file
    Rearrange {
        /// Path to the edited tree (JSON array of nodes)
        file: PathBuf,
        /// Print the planned updates without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// List workspaces
    List,
    /// Rename the selected workspace
    Rename {
        /// New workspace name
        name: String,
    },
    /// Remove the selected workspace and everything in it
    Remove {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
