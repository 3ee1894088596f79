use lcc_basic::{LangOptions, LangStandard};

use clap::Parser;

use std::path::PathBuf;

/// Defines and parses the command-line arguments accepted by the driver.
///
/// Every input is resolved through the file manager and its words are
/// interned through the identifier table, so running the driver over a tree
/// of sources exercises both the same way a lexer would.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source files to survey. A file reached through several spellings is
    /// reported once.
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,

    /// The language standard that decides which keywords are registered.
    #[clap(long = "std", default_value_t = LangStandard::Gnu99)]
    pub standard: LangStandard,

    /// Enable the Microsoft extension keywords.
    #[clap(long)]
    pub fms_extensions: bool,

    /// Enable the `bool`, `true` and `false` keywords.
    #[clap(long)]
    pub fbool: bool,

    /// Name to show for the main file in reports instead of its path.
    #[clap(long)]
    pub main_file_name: Option<String>,

    /// Print file manager and identifier table statistics to stderr.
    #[clap(long)]
    pub print_stats: bool,

    /// Print every interned identifier with its classification.
    #[clap(long)]
    pub dump_identifiers: bool,

    /// Time each stage and print a report to stderr.
    #[clap(long)]
    pub profile: bool,

    /// Log debug events to stderr. `LCC_LOG` takes precedence when set.
    #[clap(long)]
    pub verbose: bool,
}

impl Args {
    /// Parses command-line arguments from the execution environment.
    ///
    /// Exits the process with clap's message on invalid input.
    pub fn from_cli() -> Self {
        Self::parse()
    }

    /// The language options these arguments select.
    pub fn lang_options(&self) -> LangOptions {
        let mut opts = LangOptions::from_standard(self.standard);
        opts.microsoft = self.fms_extensions;
        opts.bool_ = self.fbool;
        if let Some(name) = &self.main_file_name {
            opts.set_main_file_name(name.clone());
        }
        opts
    }
}
