use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jot_core::{RowStatus, Visibility};

#[derive(Parser)]
#[command(name = "jot")]
#[command(about = "Read and write memos on a self-hosted memos server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quick capture: jot "my thought here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to a memos server and remember the session
    Login {
        /// Server base URL, e.g. https://memos.example.com
        #[arg(long, value_name = "URL")]
        server: Option<String>,
        /// Account username
        #[arg(long, value_name = "NAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the stored server and sign-in state
    Status,
    /// Show the signed-in user
    Whoami,
    /// List users on the server
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the server URL
    Server {
        #[command(subcommand)]
        command: ServerCommands,
    },
    /// List memos
    List {
        /// Only memos created by this user ID
        #[arg(long, value_name = "USER_ID")]
        creator: Option<i64>,
        /// Row status filter (server default: normal)
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Visibility filter
        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a single memo
    Show {
        /// Memo ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new memo
    #[command(alias = "new")]
    Add {
        /// Memo content
        content: Vec<String>,
        /// Memo visibility
        #[arg(long, value_enum, default_value_t = VisibilityArg::Private)]
        visibility: VisibilityArg,
    },
    /// Edit an existing memo (opens $EDITOR unless --content is given)
    Edit {
        /// Memo ID
        id: String,
        /// Replacement content
        #[arg(long)]
        content: Option<String>,
        /// New visibility
        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
    },
    /// Pin a memo
    Pin {
        /// Memo ID
        id: String,
    },
    /// Unpin a memo
    Unpin {
        /// Memo ID
        id: String,
    },
    /// Archive a memo
    Archive {
        /// Memo ID
        id: String,
    },
    /// Move an archived memo back to normal
    Restore {
        /// Memo ID
        id: String,
    },
    /// Delete a memo
    Delete {
        /// Memo ID
        id: String,
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
pub enum ServerCommands {
    /// Print the stored server URL
    Show,
    /// Store a new server URL
    Set {
        /// Server base URL
        url: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum VisibilityArg {
    Private,
    Protected,
    Public,
}

impl From<VisibilityArg> for Visibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::Private => Self::Private,
            VisibilityArg::Protected => Self::Protected,
            VisibilityArg::Public => Self::Public,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Normal,
    Archived,
}

impl From<StatusArg> for RowStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Normal => Self::Normal,
            StatusArg::Archived => Self::Archived,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
