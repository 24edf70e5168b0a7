//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], or [`validate`]. Each handler
//! lives in its own submodule.

pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::WakewardError;

pub async fn dispatch(cli: Cli) -> Result<(), WakewardError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
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
        "\n  wakeward v{version} \u{2014} Wake-on-LAN HTTP reverse proxy\n\n  \
         No command provided. To get started:\n\n    \
         wakeward init                     Generate a starter config\n    \
         wakeward run                      Start the proxy (auto-detects ./wakeward.yaml)\n    \
         wakeward run -c services.yaml     Start with a specific config file\n    \
         wakeward --help                   See all commands and options\n"
    );
}
