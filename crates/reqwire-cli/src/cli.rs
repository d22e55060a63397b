use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "reqwire: micromanages your requirements",
    long_about = "Layered, tagged requirement files: loosely pinned sources, fully pinned builds."
)]
pub struct ReqwireCli {
    #[arg(
        short = 'd',
        long,
        env = "REQWIRE_DIR_BASE",
        default_value = "requirements",
        help = "Requirements directory"
    )]
    pub directory: PathBuf,
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)"
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q")]
    pub trace: bool,
    #[arg(
        long,
        default_value = ".in",
        help = "File extension used for requirement source files"
    )]
    pub extension: String,
    #[arg(
        long,
        env = "REQWIRE_DIR_SOURCE",
        default_value = "src",
        help = "Source directory relative to the requirements directory"
    )]
    pub source_directory: String,
    #[arg(
        long,
        env = "REQWIRE_DIR_BUILD",
        default_value = "lck",
        help = "Build directory relative to the requirements directory"
    )]
    pub build_directory: String,
    #[command(subcommand)]
    pub command: CommandCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    #[command(
        about = "Initialize the requirements directory layout.",
        override_usage = "reqwire init [-f] [-i INDEX_URL] [-t TAG]...",
        after_help = "Examples:\n  reqwire init\n  reqwire init -t main -t test -i https://pypi.org/simple\n"
    )]
    Init(InitArgs),
    #[command(
        about = "Add packages to requirement source files.",
        override_usage = "reqwire add [-t TAG]... SPECIFIER...",
        after_help = "Examples:\n  reqwire add -t main flask\n  reqwire add --no-resolve-versions requests\n"
    )]
    Add(AddArgs),
    #[command(
        about = "Remove packages from requirement source files.",
        override_usage = "reqwire remove [-t TAG]... SPECIFIER...",
        after_help = "Example:\n  reqwire remove -t main flask\n"
    )]
    Remove(RemoveArgs),
    #[command(
        about = "Build fully pinned requirement files with the external resolver.",
        override_usage = "reqwire build (-a | -t TAG...) [PIP_COMPILE_OPTIONS]...",
        after_help = "Examples:\n  reqwire build -a\n  reqwire build -t main -- --no-annotate\n"
    )]
    Build(BuildArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(short, long, help = "Force initialization over an existing layout")]
    pub force: bool,
    #[arg(
        short = 'i',
        long,
        env = "PIP_INDEX_URL",
        help = "Base URL of the package index"
    )]
    pub index_url: Option<String>,
    #[arg(
        short = 't',
        long = "tag",
        help = "Tagged requirement files to create (defaults to docs, main, qa, and test)"
    )]
    pub tags: Vec<String>,
    #[arg(
        long = "extra-index-url",
        env = "PIP_EXTRA_INDEX_URL",
        help = "Extra package index URLs"
    )]
    pub extra_index_urls: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(
        short = 't',
        long = "tag",
        help = "Target requirement tags (defaults to main)"
    )]
    pub tags: Vec<String>,
    #[arg(
        short = 'e',
        long = "editable",
        help = "Add the given package in editable mode"
    )]
    pub editables: Vec<String>,
    #[arg(
        long,
        overrides_with = "no_pin",
        help = "Write resolved exact pins to the source file (default)"
    )]
    pub pin: bool,
    #[arg(
        long = "no-pin",
        overrides_with = "pin",
        help = "Keep constraints exactly as typed"
    )]
    pub no_pin: bool,
    #[arg(long = "pre", help = "Include prerelease versions")]
    pub pre: bool,
    #[arg(
        long,
        overrides_with = "no_resolve_canonical_names",
        help = "Query package indexes for canonical package names (default)"
    )]
    pub resolve_canonical_names: bool,
    #[arg(
        long = "no-resolve-canonical-names",
        overrides_with = "resolve_canonical_names",
        help = "Skip canonical package name lookups"
    )]
    pub no_resolve_canonical_names: bool,
    #[arg(
        long,
        overrides_with = "no_resolve_versions",
        help = "Resolve and pin the latest package version (default)"
    )]
    pub resolve_versions: bool,
    #[arg(
        long = "no-resolve-versions",
        overrides_with = "resolve_versions",
        help = "Skip version resolution"
    )]
    pub no_resolve_versions: bool,
    #[arg(value_name = "SPECIFIER")]
    pub specifiers: Vec<String>,
}

impl AddArgs {
    pub fn effective_pin(&self) -> bool {
        self.pin || !self.no_pin
    }

    pub fn effective_resolve_canonical_names(&self) -> bool {
        self.resolve_canonical_names || !self.no_resolve_canonical_names
    }

    pub fn effective_resolve_versions(&self) -> bool {
        self.resolve_versions || !self.no_resolve_versions
    }
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(
        short = 't',
        long = "tag",
        help = "Target requirement tags (defaults to main)"
    )]
    pub tags: Vec<String>,
    #[arg(value_name = "SPECIFIER")]
    pub specifiers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[arg(
        short = 'a',
        long = "all",
        conflicts_with = "tags",
        help = "Build every tag with a source file"
    )]
    pub all: bool,
    #[arg(
        short = 't',
        long = "tag",
        help = "Tagged requirement source files to build"
    )]
    pub tags: Vec<String>,
    #[arg(
        value_name = "PIP_COMPILE_OPTIONS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Extra options forwarded to the external resolver"
    )]
    pub pip_compile_options: Vec<String>,
}
