use clap::{Arg, Command};
use favicon_phisher::address::{prompt_for_address, AddressNormalizer, AddressValidation};
use favicon_phisher::report;
use favicon_phisher::{Config, FaviconScanner, NormalizedAddress, ScanOutcome};
use log::LevelFilter;
use std::io;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("favicon-phisher")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Favicon Phisher - A tool used to detect phishing sites using the favicon.")
        .long_about(
            "Favicon Phisher - A tool used to detect phishing sites using the favicon.\n\
             Enter an IPv4 address or website url, optionally specifying the port.\n\
             The favicon is hashed and searched on Shodan; every host sharing it is\n\
             checked for non-standard ports, suspicious domains and missing or\n\
             self-signed certificates. Requires SHODAN_API_KEY in the environment.",
        )
        .arg(
            Arg::new("address")
                .value_name("ADDRESS")
                .help("Address to check (prompted for when omitted)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(Config::default_path()),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-banner")
                .long("no-banner")
                .help("Do not print the banner")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(Config::default_path());
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = ctrlc::set_handler(|| {
        println!("\nInterrupted - script cancelled.");
        process::exit(0);
    }) {
        log::warn!("Failed to install interrupt handler: {e}");
    }

    if !matches.get_flag("no-banner") {
        display_banner();
    }

    let normalizer = AddressNormalizer::new();
    let address = match read_address(&normalizer, matches.get_one::<String>("address")) {
        Ok(Some(address)) => address,
        Ok(None) => {
            println!("\nNo address entered - script cancelled.");
            return;
        }
        Err(e) => {
            eprintln!("Error reading address: {e}");
            process::exit(1);
        }
    };

    let scanner = match FaviconScanner::from_config(&config) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    match scanner.scan(&address).await {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::debug!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    match Config::default().to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn display_banner() {
    println!("==============================================");
    println!("  Favicon Phisher v{}", env!("CARGO_PKG_VERSION"));
    println!("==============================================");
    println!("A tool to detect phishing sites using the favicon.");
    println!();
}

/// Use the address given on the command line, or prompt until a valid one is typed
fn read_address(
    normalizer: &AddressNormalizer,
    argument: Option<&String>,
) -> anyhow::Result<Option<NormalizedAddress>> {
    if let Some(raw) = argument {
        match normalizer.normalize(raw) {
            AddressValidation::Valid(address) => return Ok(Some(address)),
            AddressValidation::Invalid { reason } => {
                println!("Invalid address format ({reason}). Please enter a valid domain or IP.");
            }
        }
    }

    let stdin = io::stdin();
    prompt_for_address(normalizer, &mut stdin.lock(), &mut io::stdout())
}

fn print_outcome(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Unreachable => {
            println!("Website could not be reached.  Ensure you have a valid network connection");
        }
        ScanOutcome::HashUnavailable => {
            println!("Error: Unable to retrieve a valid favicon hash.");
        }
        ScanOutcome::NoResults { .. } => {
            println!("No valid results returned from Shodan");
        }
        ScanOutcome::Completed(summary) => {
            log::info!(
                "{} suspicious sites share favicon hash {}",
                summary.flagged_sites,
                summary.favicon_hash
            );
            if let Err(e) = report::print_scan_complete(
                &mut io::stdout(),
                &summary.report_path,
                summary.target.as_ref(),
            ) {
                log::error!("Failed to print scan summary: {e}");
            }
        }
    }
}
