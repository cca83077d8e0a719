use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use nova_estates::config::{ClientConfig, ConfigError};
use nova_estates::net::types::SettingsField;
use nova_estates::net::{ApiError, HttpSiteApi};
use nova_estates::state::admin::{SEEDED_EMAIL, SEEDED_PASSWORD};
use nova_estates::state::{ActionError, Notice, OfferField, Site};
use serde::Serialize;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("invalid --set `{0}`; expected key=value")]
    InvalidAssignment(String),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "nova-estates", about = "Nova Estates marketing site client")]
struct Cli {
    /// Overrides `ESTATES_BACKEND_URL` from the environment.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the landing page: hero copy, listings and recent offers.
    Catalog {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Submit an offer on a listed property.
    Offer(OfferArgs),
    /// Log in as admin and edit the site copy.
    Admin(AdminArgs),
}

#[derive(Args, Debug)]
struct OfferArgs {
    property_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    message: Option<String>,
}

#[derive(Args, Debug)]
struct AdminArgs {
    /// Defaults to the seeded admin account.
    #[arg(long, env = "ESTATES_ADMIN_EMAIL")]
    email: Option<String>,
    #[arg(long, env = "ESTATES_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long)]
    site_name: Option<String>,
    #[arg(long)]
    hero_headline: Option<String>,
    #[arg(long)]
    hero_subtitle: Option<String>,
    /// Any other settings key, as key=value. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,
}

#[derive(Serialize)]
struct CatalogDump<'a> {
    settings: Option<&'a nova_estates::net::types::SiteSettings>,
    properties: &'a [nova_estates::net::types::Property],
    offers: &'a [nova_estates::net::types::Offer],
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = cli.base_url.as_deref() {
        config = config.with_base_url(raw)?;
    }
    let api = HttpSiteApi::new(&config)?;
    tracing::debug!(base_url = api.base_url(), "client ready");
    let site = Site::new(Arc::new(api));

    match cli.command {
        Command::Catalog { json } => run_catalog(&site, json).await,
        Command::Offer(args) => run_offer(&site, args).await,
        Command::Admin(args) => run_admin(&site, args).await,
    }
}

async fn run_catalog(site: &Site, json: bool) -> Result<(), CliError> {
    let report = site.init().await;
    if !report.complete() {
        eprintln!("some sections could not be loaded; showing what arrived");
    }
    if json {
        let settings = site.store().settings();
        let properties = site.store().properties();
        let offers = site.store().offers();
        return print_json(&CatalogDump { settings: settings.as_ref(), properties: &properties, offers: &offers });
    }
    println!("{}", site.catalog());
    Ok(())
}

async fn run_offer(site: &Site, args: OfferArgs) -> Result<(), CliError> {
    site.init().await;
    let target = site.open_offer(&args.property_id)?;
    let flow = site.offer();
    flow.edit(OfferField::BuyerName, args.name)?;
    flow.edit(OfferField::BuyerEmail, args.email)?;
    flow.edit(OfferField::Amount, args.amount)?;
    if let Some(message) = args.message {
        flow.edit(OfferField::Message, message)?;
    }
    eprintln!("Property: {}", target.title);

    let result = flow.submit().await;
    report_notice(flow.view().notice.as_ref());
    let offer = result?;
    print_json(&offer)
}

async fn run_admin(site: &Site, args: AdminArgs) -> Result<(), CliError> {
    let edits = collect_edits(&args)?;
    site.init().await;
    site.open_admin();
    let panel = site.admin();
    if args.email.is_some() || args.password.is_some() {
        let email = args.email.unwrap_or_else(|| SEEDED_EMAIL.to_owned());
        let password = args.password.unwrap_or_else(|| SEEDED_PASSWORD.to_owned());
        panel.set_credentials(email, password)?;
    }

    let login = panel.login().await;
    report_notice(panel.view().notice.as_ref());
    login?;

    let Some(current) = panel.view().working else {
        return Err(ActionError::NotLoaded.into());
    };
    if edits.is_empty() {
        return print_json(&current);
    }

    for (field, value) in edits {
        panel.edit(&field, value)?;
    }
    let result = panel.save().await;
    report_notice(panel.view().notice.as_ref());
    let saved = result?;
    site.close_admin();
    print_json(&saved)
}

/// Named flags first, then `--set` assignments in the order given.
fn collect_edits(args: &AdminArgs) -> Result<Vec<(SettingsField, String)>, CliError> {
    let mut edits = Vec::new();
    let named = [
        (SettingsField::SiteName, &args.site_name),
        (SettingsField::HeroHeadline, &args.hero_headline),
        (SettingsField::HeroSubtitle, &args.hero_subtitle),
    ];
    for (field, value) in named {
        if let Some(value) = value {
            edits.push((field, value.clone()));
        }
    }
    for raw in &args.assignments {
        edits.push(parse_assignment(raw)?);
    }
    Ok(edits)
}

fn parse_assignment(raw: &str) -> Result<(SettingsField, String), CliError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(CliError::InvalidAssignment(raw.to_owned()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidAssignment(raw.to_owned()));
    }
    Ok((SettingsField::from_key(key), value.to_owned()))
}

fn report_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        eprintln!("{notice}");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
