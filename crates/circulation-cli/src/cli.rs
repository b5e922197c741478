use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use circulation_core::VERSION;

use crate::config::StoreBackend;

/// Circulation - library loan ledger
#[derive(Parser)]
#[command(name = "circulation")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store file
    #[arg(short, long, global = true, env = "CIRCULATION_STORE")]
    pub store: Option<String>,

    /// Store backend (inferred from the file extension when omitted)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<StoreBackend>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Config path override
    #[arg(long)]
    pub config_path: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `book add`
#[derive(Args)]
pub struct BookAddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub isbn: Option<String>,

    /// Number of copies (must be at least 1)
    #[arg(long, default_value_t = 1)]
    pub copies: u32,
}

/// Arguments for `book list`
#[derive(Args)]
pub struct BookListArgs {
    /// Only books with a copy on the shelf
    #[arg(long)]
    pub available: bool,
}

/// Arguments for `member add`
#[derive(Args)]
pub struct MemberAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,
}

/// Arguments for `loan issue`
#[derive(Args)]
pub struct LoanIssueArgs {
    /// Book ID
    #[arg(long, value_name = "ID")]
    pub book: u64,

    /// Member ID
    #[arg(long, value_name = "ID")]
    pub member: u64,
}

/// Arguments for `loan list`
#[derive(Args)]
pub struct LoanListArgs {
    /// Filter by book ID
    #[arg(long, value_name = "ID")]
    pub book: Option<u64>,

    /// Filter by member ID
    #[arg(long, value_name = "ID")]
    pub member: Option<u64>,

    /// Filter by status (issued, returned)
    #[arg(long)]
    pub status: Option<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Single-id argument shared by show/remove/return
#[derive(Args)]
pub struct IdArg {
    #[arg(value_name = "ID")]
    pub id: u64,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum BookCommand {
    /// Register a title with its copy count
    Add(BookAddArgs),
    /// Remove a book (no-op if already removed)
    Remove(IdArg),
    /// List books
    List(BookListArgs),
    /// Show one book
    Show(IdArg),
}

#[derive(Subcommand)]
pub enum MemberCommand {
    /// Register a member
    Add(MemberAddArgs),
    /// Remove a member (no-op if already removed)
    Remove(IdArg),
    /// List members
    List,
    /// Show one member
    Show(IdArg),
}

#[derive(Subcommand)]
pub enum LoanCommand {
    /// Lend a copy of a book to a member
    Issue(LoanIssueArgs),
    /// Return a loan by transaction ID
    Return(IdArg),
    /// List loan transactions
    List(LoanListArgs),
    /// Show one transaction
    Show(IdArg),
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a store and write the config file
    Init(InitArgs),

    /// Manage books
    #[command(subcommand)]
    Book(BookCommand),

    /// Manage members
    #[command(subcommand)]
    Member(MemberCommand),

    /// Issue, return and list loans
    #[command(subcommand)]
    Loan(LoanCommand),

    /// Summarize the store
    Status,

    /// Check ledger integrity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
