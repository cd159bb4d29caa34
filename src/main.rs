//! KeyMac - keyboard macro editor for the KeyMac kernel module
//!
//! Reads the macro table from the module's control file, applies one edit
//! per invocation and writes the whole table back.

use clap::{Parser, Subcommand};
use keymac::cli::{
    AddArgs, AddSlotsArgs, CliResult, ConfigArgs, DeleteArgs, DoctorArgs, GlobalArgs, KeysArgs,
    ListArgs, RebindArgs, ReloadArgs, RemoveSlotsArgs, SetArgs, ShowArgs, StoreArgs,
    ValidateArgs,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// KeyMac - keyboard macro editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the macros loaded in the kernel
    List(ListArgs),
    /// Show one macro
    Show(ShowArgs),
    /// Replace the output of a macro
    Set(SetArgs),
    /// Add a macro
    Add(AddArgs),
    /// Delete a macro
    Delete(DeleteArgs),
    /// Append a press/release pair to a macro
    AddSlots(AddSlotsArgs),
    /// Remove the last press/release pair of a macro
    RemoveSlots(RemoveSlotsArgs),
    /// Change the keys in output slots
    Rebind(RebindArgs),
    /// Save the kernel's macros to the durable store
    Store(StoreArgs),
    /// Push the durable store to the kernel
    Reload(ReloadArgs),
    /// List or search key names
    Keys(KeysArgs),
    /// Check a macro file offline
    Validate(ValidateArgs),
    /// Check the environment
    Doctor(DoctorArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        match self {
            Self::List(args) => args.execute(global),
            Self::Show(args) => args.execute(global),
            Self::Set(args) => args.execute(global),
            Self::Add(args) => args.execute(global),
            Self::Delete(args) => args.execute(global),
            Self::AddSlots(args) => args.execute(global),
            Self::RemoveSlots(args) => args.execute(global),
            Self::Rebind(args) => args.execute(global),
            Self::Store(args) => args.execute(global),
            Self::Reload(args) => args.execute(global),
            Self::Keys(args) => args.execute(global),
            Self::Validate(args) => args.execute(global),
            Self::Doctor(args) => args.execute(global),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so that --json output stays parseable
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.command.execute(&cli.global) {
        eprintln!("Error: {e}");
        std::process::exit(e.code.code());
    }
}
