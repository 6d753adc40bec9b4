use clap::{Parser, Subcommand};

use crate::cmd::{
    accounts::AccountsCommand, review::ReviewCommand, schema::SchemaCommand,
    totals::TotalsCommand,
};

mod cmd;
mod core;
mod input;

#[derive(Parser, Debug)]
#[command(
    name = "isa-allowance",
    version,
    about = "Allowance reporting for UK Cash and Stocks & Shares ISAs in GnuCash books"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review contributions against the annual allowance, per tax year
    Review(ReviewCommand),
    /// Contribution totals per ISA account and tax year
    Totals(TotalsCommand),
    /// List accounts recognised as ISAs
    Accounts(AccountsCommand),
    /// Print the JSON Schema for ledger input
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    log::debug!("Start");
    match cli.command {
        Command::Review(cmd) => cmd.exec(),
        Command::Totals(cmd) => cmd.exec(),
        Command::Accounts(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }?;
    log::debug!("Finish");
    Ok(())
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}
