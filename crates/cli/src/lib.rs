pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "propel",
    about = "Propel proposal engine operator CLI",
    long_about = "Operate Propel migrations, config inspection, and ad-hoc pricing runs.",
    after_help = "Examples:\n  propel migrate\n  propel config\n  propel price --services seo,paid_ads --term annual --discount-percent 20"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Price a service selection for one term and print the breakdown as JSON")]
    Price {
        #[arg(
            long,
            value_delimiter = ',',
            required = true,
            help = "Services to include: seo, paid_ads, website"
        )]
        services: Vec<String>,
        #[arg(long, help = "Contract term: monthly, quarterly, bi_annual, annual")]
        term: String,
        #[arg(long, default_value = "0", help = "Percent discount applied to the upfront total")]
        discount_percent: String,
        #[arg(
            long,
            default_value = "0",
            help = "Dollar discount applied after the percent discount"
        )]
        discount_dollar: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Price { services, term, discount_percent, discount_dollar } => {
            commands::price::run(&services, &term, &discount_percent, &discount_dollar)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
