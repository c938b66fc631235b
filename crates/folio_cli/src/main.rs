use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use folio_forms::serialization::load_page;
use folio_forms::{EventType, PropertyPageConfig};
use folio_runtime::{EventBus, ValidatorRegistry, evaluate_expression};
use folio_ui::{ClientConfig, HttpBackend, PageSession, WizardController, render};
use log::{debug, info, warn};
use serde_json::Value;

fn cli() -> Command {
    let page = || Arg::new("page").required(true).value_name("PAGE").help("Property page JSON file");
    Command::new("folio")
        .about("Headless property page engine")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .help("Client configuration (TOML)"),
        )
        .subcommand(
            Command::new("render").about("Render a property page").arg(page()).arg(
                Arg::new("json")
                    .long("json")
                    .short('j')
                    .help("Print the control tree as JSON")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("locate")
                .about("Find the control owning a property path")
                .arg(page())
                .arg(Arg::new("path").required(true).value_name("PATH")),
        )
        .subcommand(
            Command::new("eval")
                .about("Evaluate a condition against the page values")
                .arg(page())
                .arg(Arg::new("expression").required(true).value_name("EXPRESSION")),
        )
        .subcommand(Command::new("validate").about("Check the built-in constraints of a page").arg(page()))
        .subcommand(
            Command::new("modal")
                .about("Open a modal from the server and print its first page")
                .arg(Arg::new("action").required(true).value_name("ACTION")),
        )
}

fn load_config(matches: &ArgMatches) -> Result<ClientConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => ClientConfig::load(path).with_context(|| format!("cannot read config {path}")),
        None => Ok(ClientConfig::default()),
    }
}

fn page_arg(matches: &ArgMatches) -> Result<PropertyPageConfig> {
    let Some(path) = matches.get_one::<String>("page") else {
        bail!("missing page file");
    };
    load_page(Path::new(path)).with_context(|| format!("cannot load page {path}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level)).init();

    debug!("Using server {}", config.base_url);
    if let Some((name, _)) = matches.subcommand() {
        info!("Running {}", name);
    }

    match matches.subcommand() {
        Some(("render", sub)) => {
            let tree = render(&page_arg(sub)?);
            if sub.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{tree}");
            }
        }
        Some(("locate", sub)) => {
            let page = page_arg(sub)?;
            let path = sub.get_one::<String>("path").map(String::as_str).unwrap_or_default();
            match page.locate(path) {
                Some(found) => {
                    println!("{} {}", found.control.kind().as_str(), found.value_path);
                    if let Some(row) = found.index {
                        println!("row {row}");
                    }
                }
                None => bail!("no control owns {path}"),
            }
        }
        Some(("eval", sub)) => {
            let page = page_arg(sub)?;
            let expression = sub.get_one::<String>("expression").cloned().unwrap_or_default();
            let result = evaluate_expression(&Value::String(expression), &page.controls)?;
            println!("{result}");
        }
        Some(("validate", sub)) => {
            let session = PageSession::new(page_arg(sub)?);
            let report = session.validate(&ValidatorRegistry::new().with_radix_point(config.radix_point));
            for issue in &report.issues {
                println!("{}: {}", issue.name, issue.issue);
            }
            if !report.is_valid() {
                bail!("{} invalid field(s)", report.issues.len());
            }
            println!("ok");
        }
        Some(("modal", sub)) => {
            let action = sub.get_one::<String>("action").map(String::as_str).unwrap_or_default();
            let bus = EventBus::new();
            let errors = bus.subscribe(&[EventType::ErrorEvent]);
            let validators = ValidatorRegistry::new().with_radix_point(config.radix_point);
            let mut wizard = WizardController::new(HttpBackend::new(&config), bus, validators);

            if let Err(e) = wizard.open(action).await {
                warn!("Cannot open modal {}: {}", action, e);
                for event in errors.try_iter() {
                    if let Some(notification) = event.notification() {
                        eprintln!("{}", notification.message);
                    }
                }
                return Err(e.into());
            }
            info!("Opened modal {} at page {}", action, wizard.page_number());
            println!("{} ({} page(s))", wizard.title(), wizard.pages().len());
            if let Some(tree) = wizard.tree() {
                print!("{tree}");
            }
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
