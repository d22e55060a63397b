use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use reqwire_core::{
    AddRequest, BuildOptions, Config, PackageIndexResolver, DEFAULT_INIT_TAGS, DEFAULT_TAG,
};

mod cli;
mod pip_compile;

use cli::{AddArgs, BuildArgs, CommandCli, InitArgs, RemoveArgs, ReqwireCli};
use pip_compile::PipCompileResolver;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = ReqwireCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let config = Config {
        directory: cli.directory.clone(),
        source_dir: cli.source_directory.clone(),
        build_dir: cli.build_directory.clone(),
        extension: cli.extension.clone(),
    };

    match &cli.command {
        CommandCli::Init(args) => run_init(&cli, &config, args),
        CommandCli::Add(args) => run_add(&cli, &config, args),
        CommandCli::Remove(args) => run_remove(&cli, &config, args),
        CommandCli::Build(args) => run_build(&cli, &config, args),
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("reqwire={level},reqwire_core={level},reqwire_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_init(cli: &ReqwireCli, config: &Config, args: &InitArgs) -> Result<()> {
    if !args.force && config.directory.exists() {
        return Err(eyre!(
            "requirements directory already exists (use --force to reinitialize)"
        ));
    }
    let tags = if args.tags.is_empty() {
        DEFAULT_INIT_TAGS.iter().map(ToString::to_string).collect()
    } else {
        args.tags.clone()
    };
    let report = reqwire_core::init(
        config,
        args.force,
        args.index_url.as_deref(),
        &args.extra_index_urls,
        &tags,
    )
    .map_err(|err| eyre!("{err}"))?;
    if !cli.quiet {
        for path in &report.created {
            println!("created {}", path.display());
        }
    }
    Ok(())
}

fn run_add(cli: &ReqwireCli, config: &Config, args: &AddArgs) -> Result<()> {
    ensure_initialized(config)?;
    let mut specifiers: Vec<String> = args
        .editables
        .iter()
        .map(|target| format!("-e {target}"))
        .collect();
    specifiers.extend(args.specifiers.iter().cloned());
    if specifiers.is_empty() {
        return Err(eyre!("no specifiers provided"));
    }

    let request = AddRequest {
        specifiers,
        tags: tags_or_default(&args.tags),
        options: BuildOptions {
            pin: args.effective_pin(),
            prereleases: args.pre,
            resolve_canonical_names: args.effective_resolve_canonical_names(),
            resolve_versions: args.effective_resolve_versions(),
        },
    };
    let report = reqwire_core::add(config, &request, &PackageIndexResolver)
        .map_err(|err| eyre!("{err}"))?;
    if !cli.quiet {
        for path in &report.written {
            println!("saved {}", path.display());
        }
    }
    Ok(())
}

fn run_remove(cli: &ReqwireCli, config: &Config, args: &RemoveArgs) -> Result<()> {
    ensure_initialized(config)?;
    if args.specifiers.is_empty() {
        return Err(eyre!("no specifiers provided"));
    }
    let report = reqwire_core::remove(config, &tags_or_default(&args.tags), &args.specifiers)
        .map_err(|err| eyre!("{err}"))?;
    if !cli.quiet {
        for (tag, specifier) in &report.removed {
            println!("removed {specifier} from {tag}");
        }
    }
    Ok(())
}

fn run_build(cli: &ReqwireCli, config: &Config, args: &BuildArgs) -> Result<()> {
    ensure_initialized(config)?;
    if !args.all && args.tags.is_empty() {
        return Err(eyre!("either --all or --tag must be provided"));
    }
    let resolver = PipCompileResolver::new(args.pip_compile_options.clone());
    let report =
        reqwire_core::build(config, &args.tags, false, &resolver).map_err(|err| eyre!("{err}"))?;
    if !cli.quiet {
        for path in &report.written {
            println!("built {}", path.display());
        }
    }
    Ok(())
}

fn tags_or_default(tags: &[String]) -> Vec<String> {
    if tags.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        tags.to_vec()
    }
}

fn ensure_initialized(config: &Config) -> Result<()> {
    if !config.directory.exists() {
        return Err(eyre!("run `reqwire init` first"));
    }
    Ok(())
}
