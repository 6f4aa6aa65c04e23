// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use tribunal_admin::{
    amount_to_words, format_currency, format_date_ar, format_percentage_with, latest_summary,
    try_parse_date, try_parse_monetary_string, try_round_legal, AccessLevel, AppConfig,
    CredentialStore, Dataset, DatasetKind, NewUser, SqliteUserStore, LEGAL_PLACES,
};

const USAGE: &str = "\
Usage: tribunal-admin [command]

Commands:
  ui                                  Open the dashboard (default)
  latest [--json]                     Latest value of every dataset
  show <dataset>                      Print a dataset (jus, ipc, ripte, pisos, tasa)
  users list
  users add <user> <password> [--admin] [--name <full name>] [--email <email>]
  users passwd <user> <password>
  users delete <user>
  fmt money <amount>                  $ 1.234,56
  fmt pct <fraction> [decimals]       15,00%
  fmt words <amount>                  PESOS ... CON nn/100
  fmt date <text> [largo|corto|texto]
  fmt round <amount> [places]
  fmt clean <text>                    \"$ 1.234,56\" -> 1234.56

Environment:
  TRIBUNAL_DATA_DIR   dataset directory (default: data)
  TRIBUNAL_USERS_DB   user database (default: <data dir>/usuarios.db)
  RUST_LOG            log filter (default: warn)";

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["ui"] => run_ui_mode(&config),
        ["latest", rest @ ..] => run_latest(&config, rest),
        ["show", dataset] => run_show(&config, dataset),
        ["users", rest @ ..] => run_users(&config, rest),
        ["fmt", rest @ ..] => run_fmt(rest),
        ["help"] | ["--help"] | ["-h"] => {
            println!("{}", USAGE);
            Ok(())
        }
        _ => bail!("Invalid arguments\n\n{}", USAGE),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_latest(config: &AppConfig, args: &[&str]) -> Result<()> {
    let json = match args {
        [] => false,
        ["--json"] => true,
        _ => bail!("Usage: tribunal-admin latest [--json]"),
    };

    let entries = latest_summary(&config.data_dir);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("📅 Sin datos disponibles en {}", config.data_dir.display());
        return Ok(());
    }

    println!("📅 Últimos datos disponibles");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in &entries {
        println!("  {}", entry);
    }

    Ok(())
}

fn run_show(config: &AppConfig, dataset: &str) -> Result<()> {
    let kind: DatasetKind = dataset.parse()?;
    let dataset = Dataset::load(kind, &config.dataset_path(kind))?;

    println!("📊 {} ({} filas)", kind.label(), dataset.len());
    println!("{}", dataset.headers.join(" | "));
    for row in &dataset.rows {
        println!("{}", row.join(" | "));
    }

    Ok(())
}

fn run_users(config: &AppConfig, args: &[&str]) -> Result<()> {
    let store = SqliteUserStore::open(&config.users_db)?;

    match args {
        ["list"] => {
            let users = store.list_users()?;
            for user in &users {
                let last_access = user
                    .last_access
                    .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<16} {:<7} {:<28} {:<30} {:<17} {}",
                    user.username,
                    user.level,
                    user.full_name,
                    user.email,
                    last_access,
                    if user.active { "✅" } else { "❌" }
                );
            }
            println!("Total de usuarios: {}", users.len());
        }
        ["add", username, password, options @ ..] => {
            let mut new_user = NewUser {
                username: username.to_string(),
                password: password.to_string(),
                ..NewUser::default()
            };

            let mut options = options.iter();
            while let Some(option) = options.next() {
                match *option {
                    "--admin" => new_user.level = AccessLevel::Admin,
                    "--name" => new_user.full_name = next_value(&mut options, "--name")?,
                    "--email" => new_user.email = next_value(&mut options, "--email")?,
                    other => bail!("Unknown option: {}", other),
                }
            }

            let user = store.create_user(&new_user)?;
            println!("✅ Usuario '{}' creado ({})", user.username, user.level);
        }
        ["passwd", username, password] => {
            store.change_password(username, password)?;
            println!("✅ Contraseña de '{}' actualizada", username);
        }
        ["delete", username] => {
            store.delete_user(username)?;
            println!("✅ Usuario '{}' eliminado", username);
        }
        _ => bail!("Usage: tribunal-admin users list|add|passwd|delete ..."),
    }

    Ok(())
}

fn next_value(options: &mut std::slice::Iter<'_, &str>, flag: &str) -> Result<String> {
    options
        .next()
        .map(|v| v.to_string())
        .with_context(|| format!("{} needs a value", flag))
}

fn run_fmt(args: &[&str]) -> Result<()> {
    let output = match args {
        ["money", value] => format_currency(parse_number(value)?),
        ["pct", value] => format_percentage_with(parse_number(value)?, 2),
        ["pct", value, decimals] => {
            let decimals: usize = decimals
                .parse()
                .with_context(|| format!("Invalid decimals: {}", decimals))?;
            format_percentage_with(parse_number(value)?, decimals)
        }
        ["words", value] => amount_to_words(parse_number(value)?),
        ["date", value] => format_date_ar(try_parse_date(value)?, Default::default()),
        ["date", value, style] => format_date_ar(try_parse_date(value)?, style.parse()?),
        ["round", value] => try_round_legal(parse_number(value)?, LEGAL_PLACES)?.to_string(),
        ["round", value, places] => {
            let places: u32 = places
                .parse()
                .with_context(|| format!("Invalid places: {}", places))?;
            try_round_legal(parse_number(value)?, places)?.to_string()
        }
        ["clean", value] => try_parse_monetary_string(value)?.to_string(),
        _ => bail!("Usage: tribunal-admin fmt money|pct|words|date|round|clean <value>"),
    };

    println!("{}", output);
    Ok(())
}

fn parse_number(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Not a number: {}", value))
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let store = SqliteUserStore::open(&config.users_db)?;

    let mut app = ui::App::new(config.clone(), store);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    bail!("Dashboard not available: rebuild with --features tui")
}
