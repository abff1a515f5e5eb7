use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codewalk")]
#[command(about = "Resolve sam-style addresses and walk through highlighted code")]
#[command(long_about = "codewalk resolves Plan 9 sam-style addresses against source files.

An address selects a byte range in a file; codewalk widens it to whole lines
and prints the fragment with a few lines of leading context.

ADDRESSES:
  12             Line 12
  12,20          Lines 12 through 20
  #40            The position after the 40th character
  /fn main/      First match of a regular expression (wraps around)
  /fn main/,+3   The match through the third line after it
  /(?m)^}/       Use (?m) for ^ and $ to match at line boundaries
  $              End of file; $-2 is the last line of a newline-terminated file
  +, +n          Next line, or the nth line, after the current selection
  -, -n          Start of the current line; -2 is the line before it

EXAMPLES:
  codewalk resolve src/main.rs '/fn main/,+3'
  codewalk resolve src/lib.rs 10,20 --json
  codewalk walk docs/tour.toml --root .
  codewalk print src/lib.rs --lo 10 --hi 20")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address in a file and show the fragment
    Resolve {
        /// File to address
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Address expression (e.g. '12,20', '/pattern/', '$-2')
        #[arg(value_name = "ADDRESS", allow_hyphen_values = true)]
        address: String,

        /// Lines of leading context to show
        #[arg(short = 'n', long, value_name = "NUM")]
        context: Option<usize>,

        /// Print the resolved location as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a walk document and resolve all of its steps
    #[command(long_about = "Load a walk document and resolve every step.

A walk is a TOML file with a title and a list of steps; each step's `src`
is `file` or `file:address`. Steps that fail are reported individually and
do not stop the rest of the walk.

EXAMPLE WALK:
  title = \"Tour of the parser\"

  [[step]]
  src = \"src/parser.rs:/fn parse/,+3\"
  title = \"Entry point\"
  body = \"Parsing starts here.\"")]
    Walk {
        /// Walk document
        #[arg(value_name = "WALK")]
        path: PathBuf,

        /// Directory step files are relative to (default: the walk's directory)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Print the resolved walk as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a file with a line range highlighted
    Print {
        /// File to print
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// First highlighted line
        #[arg(long, value_name = "LINE")]
        lo: usize,

        /// Last highlighted line (default: same as --lo)
        #[arg(long, value_name = "LINE")]
        hi: Option<usize>,

        /// Lines of leading context to show
        #[arg(short = 'n', long, value_name = "NUM")]
        context: Option<usize>,

        /// Print the whole file instead of just the context and highlight
        #[arg(long)]
        full: bool,
    },

    /// Show the configuration file
    #[command(long_about = "Show the codewalk configuration file.

The file lives at ~/.codewalk/config.toml and is created with defaults on
first use.

CONFIGURATION OPTIONS:
  [display]
    context_lines = 4   # Leading context lines (max 20)
    color = true        # Colorize terminal output

  [logging]
    debug = false       # Log to ~/.codewalk/codewalk.log")]
    Config {
        /// Print the effective configuration instead of the file location
        #[arg(long = "show")]
        show: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    let cli = Cli::parse();

    Ok(match cli.command {
        Commands::Resolve {
            file,
            address,
            context,
            json,
        } => Args::Resolve {
            file,
            address,
            context,
            json,
        },
        Commands::Walk { path, root, json } => Args::Walk { path, root, json },
        Commands::Print { file, lo, hi, context, full } => Args::Print {
            file,
            lo,
            hi: hi.unwrap_or(lo),
            context,
            full,
        },
        Commands::Config { show } => Args::Config { show },
    })
}

#[derive(Debug)]
pub enum Args {
    Resolve {
        file: PathBuf,
        address: String,
        context: Option<usize>,
        json: bool,
    },
    Walk {
        path: PathBuf,
        root: Option<PathBuf>,
        json: bool,
    },
    Print {
        file: PathBuf,
        lo: usize,
        hi: usize,
        context: Option<usize>,
        full: bool,
    },
    Config {
        show: bool,
    },
}
