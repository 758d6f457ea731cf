//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], or [`validate`].

pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::ShadowtapError;

pub async fn dispatch(cli: Cli) -> Result<(), ShadowtapError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  shadowtap v{version} \u{2014} HTTP traffic-shadowing forwarder\n\n  \
         No command provided. To get started:\n\n    \
         shadowtap init                  Generate a starter config.json\n    \
         shadowtap run                   Start the forwarder with ./config.json\n    \
         shadowtap run -f shadow.yaml    Start with a specific config file\n    \
         shadowtap --help                See all commands and options\n"
    );
}
