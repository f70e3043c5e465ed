use clap::Parser;
use passvault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            ref listen,
            ref database,
            ref wordlist,
            in_memory,
        } => passvault::cli::commands::serve::execute(
            &cli,
            listen.as_deref(),
            database.as_deref(),
            wordlist.as_deref(),
            in_memory,
        ),
        Commands::Create { ref user } => passvault::cli::commands::create::execute(&cli, user),
        Commands::Retrieve { ref user } => passvault::cli::commands::retrieve::execute(&cli, user),
        Commands::Update { ref user, ref file } => {
            passvault::cli::commands::update::execute(&cli, user, file)
        }
        Commands::Delete { ref user, force } => {
            passvault::cli::commands::delete::execute(&cli, user, force)
        }
        Commands::Generate { scheme, size } => {
            passvault::cli::commands::generate::execute(&cli, scheme, size)
        }
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
