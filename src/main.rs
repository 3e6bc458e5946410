//! statdns proxy binary.
//!
//! Runs a SOCKS5 proxy on `127.0.0.1:9001` (by default) that resolves every
//! requested hostname through the remote HTTP lookup service.

use std::process::ExitCode;

use clap::Parser;
use statdns_socks::ProxyArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ProxyArgs::parse();

    match statdns_socks::cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
