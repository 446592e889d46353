use clap::{App, AppSettings};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("epochcoin")
        .about("Epochcoin UTXO ledger CLI tools.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(epochcoin_lib::commands::epoch_command())
        .get_matches();

    if let Some(ref matches) = matches.subcommand_matches("epoch") {
        epochcoin_lib::commands::run_epoch_command(&matches)
    } else {
        panic!("Should report help.");
    }
}
