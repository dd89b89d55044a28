use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Shelf - shell startup hooks and command-line tools from one registry
///
/// shelf keeps a registry (`scripts.conf`) of startup scripts sourced from
/// your shell profile and tool scripts linked into a bin directory. Toggle
/// entries on or off and apply to make your environment match.
///
/// Run without a command for an interactive menu.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the registry and script directories
    Init,

    /// List registry entries
    #[command(visible_alias = "show")]
    List,

    /// Enable or disable an entry, then apply
    Toggle {
        /// Position of the entry as shown by `shelf list`
        #[arg(value_name = "INDEX", allow_negative_numbers = true)]
        index: i64,

        /// Only update the registry; skip applying
        #[arg(long)]
        no_apply: bool,
    },

    /// Rebuild profile blocks and tool links from the registry
    Apply,

    /// Print the shell line that puts the bin directory on PATH
    Env {
        /// Shell type (zsh, bash, fish); defaults to the configured shell
        #[arg(short, long, value_name = "SHELL")]
        shell: Option<String>,
    },

    /// Archive files into a .tar.gz (defaults to the shelf directory)
    Pack {
        /// Archive to write
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Files or directories to include
        #[arg(value_name = "PATHS")]
        paths: Vec<PathBuf>,

        /// Directory that relative paths and archive names are based on
        #[arg(long, value_name = "DIR")]
        base: Option<PathBuf>,
    },

    /// Restore an archive created by `shelf pack`
    Unpack {
        /// Archive to read
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Destination directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        dest: PathBuf,
    },

    /// Delete `*:Zone.Identifier` download markers under a directory
    Sweep {
        /// Directory to clean
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Only list what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a command and save its output to a timestamped log
    Run {
        /// Do not mirror output to the terminal
        #[arg(short, long)]
        quiet: bool,

        /// Directory for log files (defaults to the shelf state directory)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// Command and arguments
        #[arg(
            value_name = "COMMAND",
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<OsString>,
    },
}
