use std::io::Write;

use clap::{Arg, ArgAction, Command};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use propstore::config::{self, BUNDLED_CONFIG, RESOURCE_NAME};
use propstore::{ConfigStore, Resources};

fn prompt() -> std::io::Result<()> {
    print!("?> ");
    std::io::stdout().flush()
}

fn lookup(store: &ConfigStore, key: &str) -> String {
    match store.get(key) {
        Some(value) => value.to_string(),
        None => "ERROR key not found".to_string(),
    }
}

// A failed load only stops the tool under --strict; otherwise it keeps
// answering from an empty store, the same way library callers see it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("propstore-cli")
        .about("Look up keys in the bundled config.properties")
        .arg(
            Arg::new("file")
                .long("file")
                .value_name("PATH")
                .help("Load this properties file instead of the embedded resource")
                .conflicts_with("resource-dir"),
        )
        .arg(
            Arg::new("resource-dir")
                .long("resource-dir")
                .value_name("DIR")
                .help("Search this directory for config.properties (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("beside-exe")
                .long("beside-exe")
                .help("Search next to this executable instead of using the embedded resource")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["file", "resource-dir"]),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Exit with status 1 if the configuration cannot be loaded")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keys")
                .help("Keys to print; starts an interactive prompt when omitted")
                .num_args(1..),
        )
        .get_matches();

    let resources = match matches.get_many::<String>("resource-dir") {
        Some(dirs) => Some(Resources::from_dirs(dirs)),
        None if matches.get_flag("beside-exe") => Some(Resources::bundled()),
        None => None,
    };
    let (source, loaded) = match (matches.get_one::<String>("file"), resources) {
        (Some(path), _) => (path.clone(), config::load_config(path)),
        (None, Some(resources)) => {
            match ConfigStore::load_with_path(&resources, RESOURCE_NAME) {
                Ok((path, store)) => (path.display().to_string(), Ok(store)),
                Err(e) => (RESOURCE_NAME.to_string(), Err(e)),
            }
        }
        (None, None) => (
            format!("embedded {}", RESOURCE_NAME),
            ConfigStore::parse(BUNDLED_CONFIG),
        ),
    };

    let (store, failure) = match loaded {
        Ok(store) => (store, None),
        Err(e) => (ConfigStore::empty(), Some(e)),
    };

    // Values go to stdout, diagnostics to stderr.
    tracing_subscriber::fmt()
        .with_max_level(config::log_level(&store))
        .with_writer(std::io::stderr)
        .init();

    let status = match &failure {
        Some(e) => {
            error!("Failed to load configuration: {}", e);
            if matches.get_flag("strict") {
                std::process::exit(1);
            }
            format!("ERROR: {}", e)
        }
        None => {
            info!("Loaded {} entries from {}", store.len(), source);
            format!("OK {} entries from {}", store.len(), source)
        }
    };

    if let Some(keys) = matches.get_many::<String>("keys") {
        for key in keys {
            println!("{}", lookup(&store, key));
        }
        return Ok(());
    }

    prompt()?;
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut command_buf = String::new();

    loop {
        command_buf.clear();
        if stdin.read_line(&mut command_buf).await? == 0 {
            break; // EOF
        }

        let parts: Vec<&str> = command_buf.split_whitespace().collect();
        if parts.is_empty() {
            prompt()?;
            continue;
        }

        match parts[0].to_uppercase().as_str() {
            "GET" => {
                if parts.len() != 2 {
                    println!("ERROR invalid arguments");
                } else {
                    println!("{}", lookup(&store, parts[1]));
                }
            }
            "STATUS" => println!("{}", status),
            "QUIT" | "EXIT" => break,
            _ => println!("ERROR unknown command"),
        }
        prompt()?;
    }

    Ok(())
}
