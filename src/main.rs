//! `wikibot` command line entry point
//!
//! Failures print `error <code>: <message>` on stderr and exit with status 1.
//! The code is the stable numeric code of the library error, or 1 for
//! problems outside the library (bad arguments, unreadable input).

use clap::Parser;
use wikibot::cli::{Cli, run};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<wikibot::Error>()
            .map(wikibot::Error::code)
            .unwrap_or(1);
        eprintln!("error {}: {:#}", code, e);
        std::process::exit(1);
    }
}
