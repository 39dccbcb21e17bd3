mod cli;

use clap::Parser;

use cli::{Cli, Commands, RulesCommands};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, backend } => cli::init::run(data_dir, backend),
        Commands::Teach {
            description,
            category,
            note,
        } => cli::teach::run(&description, &category, &note),
        Commands::Predict {
            description,
            explain,
            policy,
        } => cli::predict::run(&description, explain, policy),
        Commands::Rules { command } => match command {
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Export { output } => cli::rules::export(output.as_deref()),
            RulesCommands::Import { file } => cli::rules::import(&file),
        },
        Commands::Clear => cli::clear::run(),
        Commands::Context {
            message,
            kind,
            limit,
        } => cli::context::run(message.as_deref(), kind, limit),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
