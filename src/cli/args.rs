use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// fileutil — filesystem helpers for scripts and cron jobs
#[derive(Parser, Debug)]
#[command(
    name = "fileutil",
    version,
    about = "Filesystem helpers: age sweeps, line streaming, downloads",
    long_about = "fileutil sweeps old files out of directory trees, streams large\n\
                   files line by line, downloads files and provisions virtual disks.",
    after_help = "EXAMPLES:\n  \
        fileutil sweep /var/tmp/cache --older-than 7d          Delete week-old files\n  \
        fileutil sweep logs --older-than 2h --suffix .log      Only .log files\n  \
        fileutil sweep logs --older-than 1d --dry-run          List, don't delete\n  \
        fileutil lines big.csv --head 10                       First 10 lines\n  \
        cat data.txt | fileutil lines                          Lines from stdin\n  \
        fileutil download https://example.com/f.zip f.zip     Download a file\n  \
        fileutil mkdir out/a out/b                             Create folders\n  \
        fileutil exists out/a                                  file/folder/missing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode — minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete files older than a threshold
    Sweep {
        /// Directory to sweep
        root: PathBuf,

        /// Minimum file age, e.g. 30s, 15m, 2h, 7d (default from config)
        #[arg(long, value_name = "AGE")]
        older_than: Option<String>,

        /// Only files whose name starts with this
        #[arg(long)]
        prefix: Option<String>,

        /// Only files whose name ends with this
        #[arg(long)]
        suffix: Option<String>,

        /// Only files whose name matches this regex
        #[arg(long, value_name = "PATTERN")]
        regex: Option<String>,

        /// List eligible files without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a file (or piped stdin) line by line
    Lines {
        /// File to read; stdin when omitted
        path: Option<PathBuf>,

        /// Longest accepted line in bytes (default from config)
        #[arg(long, value_name = "BYTES")]
        max_line_bytes: Option<usize>,

        /// Stop after this many lines
        #[arg(long, value_name = "N")]
        head: Option<usize>,
    },

    /// Download a URL to a file
    Download {
        /// Source URL
        url: String,

        /// Destination file
        dest: PathBuf,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },

    /// Create folders (with parents, owner-only permissions)
    Mkdir {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Report whether a path is a file, a folder, or missing
    Exists {
        path: PathBuf,
    },

    /// Create, format and optionally mount a file-backed disk
    Vdisk {
        /// Backing file
        #[arg(long)]
        file: PathBuf,

        /// Size in gigabytes
        #[arg(long, default_value = "1")]
        size_gb: u64,

        /// Filesystem (default from config)
        #[arg(long)]
        fs: Option<String>,

        /// Where to mount
        #[arg(long)]
        mount_point: Option<PathBuf>,

        /// Use the backing file as-is
        #[arg(long)]
        no_truncate: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Create the data directory and default config
    Init,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
