// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::Session;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_app::{Client, Entity, EntityKind, Invoice, Payment, Router, Sector, ServicePlan};
use tally_table::{Table, TableCommand, TableOptions};
use tally_testkit::IspFaker;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_DEMO_COUNT: usize = 250;
const DEMO_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    entity: EntityKind,
    data_path: Option<PathBuf>,
    demo_count: Option<usize>,
    search: Option<String>,
    sort_clicks: Vec<String>,
    reveals: usize,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tally --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_tracing(config.log_filter())?;
    let table_options = config.table_options()?;

    if options.check_only {
        for kind in EntityKind::ALL {
            check_profile(kind)?;
        }
        info!(config = %options.config_path.display(), "config and table profiles are valid");
        return Ok(());
    }

    if options.data_path.is_none() && options.demo_count.is_none() {
        bail!("no records to show; pass --data <file.json> or --demo [count]");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_listing(&options, table_options, &mut out)
}

fn run_listing(
    options: &CliOptions,
    table_options: TableOptions,
    out: &mut impl Write,
) -> Result<()> {
    match options.entity {
        EntityKind::Clients => {
            run_entity::<Client>(options, table_options, IspFaker::clients, out)
        }
        EntityKind::Payments => {
            run_entity::<Payment>(options, table_options, IspFaker::payments, out)
        }
        EntityKind::Invoices => {
            run_entity::<Invoice>(options, table_options, IspFaker::invoices, out)
        }
        EntityKind::Plans => {
            run_entity::<ServicePlan>(options, table_options, IspFaker::service_plans, out)
        }
        EntityKind::Routers => {
            run_entity::<Router>(options, table_options, IspFaker::routers, out)
        }
        EntityKind::Sectors => {
            run_entity::<Sector>(options, table_options, IspFaker::sectors, out)
        }
    }
}

fn init_tracing(config_filter: &str) -> Result<()> {
    let filter = log_filter(env::var("TALLY_LOG").ok(), config_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("initialize logging: {error}"))
}

// TALLY_LOG wins over the config file when set and non-empty.
fn log_filter(env_value: Option<String>, config_filter: &str) -> Result<EnvFilter> {
    match env_value.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => {
            EnvFilter::try_new(&raw).with_context(|| format!("invalid TALLY_LOG {raw:?}"))
        }
        None => EnvFilter::try_new(config_filter)
            .with_context(|| format!("invalid [log].filter {config_filter:?}")),
    }
}

fn check_profile(kind: EntityKind) -> Result<()> {
    match kind {
        EntityKind::Clients => Client::profile().map(drop),
        EntityKind::Payments => Payment::profile().map(drop),
        EntityKind::Invoices => Invoice::profile().map(drop),
        EntityKind::Plans => ServicePlan::profile().map(drop),
        EntityKind::Routers => Router::profile().map(drop),
        EntityKind::Sectors => Sector::profile().map(drop),
    }
}

fn run_entity<E>(
    options: &CliOptions,
    table_options: TableOptions,
    demo: fn(&mut IspFaker, usize) -> Vec<E>,
    out: &mut impl Write,
) -> Result<()>
where
    E: Entity + Serialize + DeserializeOwned,
{
    let records = match (&options.data_path, options.demo_count) {
        (Some(path), _) => load_snapshot::<E>(path)?,
        (None, Some(count)) => demo(&mut IspFaker::new(DEMO_SEED), count),
        (None, None) => Vec::new(),
    };
    debug!(
        entity = E::KIND.as_str(),
        records = records.len(),
        "snapshot loaded"
    );

    let mut session = Session::new(Table::new(E::profile()?, table_options));
    session.send(TableCommand::ReplaceRecords {
        records: Arc::from(records),
        is_loading: false,
    });

    if let Some(search) = &options.search {
        session.send(TableCommand::SearchInput(search.clone()));
        session.settle()?;
    }

    for field in &options.sort_clicks {
        session
            .sort_by(field)
            .with_context(|| format!("sort {}", E::KIND.label()))?;
    }

    for _ in 0..options.reveals {
        if !session.scroll_to_end()? {
            break;
        }
    }

    let view = session.table().view();
    for row in &view.rows {
        let line = serde_json::to_string(row).context("encode row as JSON")?;
        writeln!(out, "{line}").context("write row")?;
    }

    let summary = serde_json::json!({
        "entity": E::KIND.as_str(),
        "visible": view.rows.len(),
        "matches": view.total_matches,
        "records": view.total_records,
        "search": session.table().search(),
        "sort": {
            "field": view.sort.field,
            "direction": view.sort.direction.as_str(),
        },
        "reached_end": view.reached_end,
    });
    writeln!(out, "{summary}").context("write summary")?;
    out.flush().context("flush output")
}

fn load_snapshot<E: DeserializeOwned>(path: &Path) -> Result<Vec<E>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| {
        format!(
            "decode snapshot {}; expected a JSON array of records",
            path.display()
        )
    })
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        entity: EntityKind::Clients,
        data_path: None,
        demo_count: None,
        search: None,
        sort_clicks: Vec::new(),
        reveals: 0,
    };

    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "--entity" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--entity requires a name"))?;
                options.entity = EntityKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown entity {:?}; expected one of: {}",
                        value.as_ref(),
                        entity_names()
                    )
                })?;
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--demo" => {
                let next = iter
                    .peek()
                    .map(|next| AsRef::<str>::as_ref(next).to_owned());
                let count = match next {
                    Some(raw) if !raw.starts_with('-') => {
                        iter.next();
                        raw.parse::<usize>().map_err(|_| {
                            anyhow!("--demo count must be a non-negative integer, got {raw:?}")
                        })?
                    }
                    _ => DEFAULT_DEMO_COUNT,
                };
                options.demo_count = Some(count);
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires text"))?;
                options.search = Some(value.as_ref().to_owned());
            }
            "--sort" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sort requires a field name"))?;
                options.sort_clicks.push(value.as_ref().to_owned());
            }
            "--reveal" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--reveal requires a count"))?;
                options.reveals = value.as_ref().parse().map_err(|_| {
                    anyhow!(
                        "--reveal count must be a non-negative integer, got {:?}",
                        value.as_ref()
                    )
                })?;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.data_path.is_some() && options.demo_count.is_some() {
        bail!("--data and --demo are mutually exclusive; pick one record source");
    }

    Ok(options)
}

fn entity_names() -> String {
    EntityKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_help() {
    println!("tally");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and every table profile");
    println!("  --entity <name>          List to show: {}", entity_names());
    println!("  --data <file.json>       Load a JSON array snapshot of that entity");
    println!("  --demo [count]           Use seeded fake records (default {DEFAULT_DEMO_COUNT})");
    println!("  --search <text>          Filter rows (case-insensitive substring)");
    println!("  --sort <field>           Click a column header; repeat to toggle");
    println!("  --reveal <n>             Scroll to the end n times, revealing more rows");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{
        CliOptions, DEFAULT_DEMO_COUNT, load_snapshot, log_filter, parse_cli_args, run_listing,
    };
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Duration;
    use tally_app::{Client, EntityKind, Payment};
    use tally_table::{TableOptions, WindowConfig};

    fn fast_options() -> TableOptions {
        TableOptions {
            window: WindowConfig {
                reveal_delay: Duration::from_millis(1),
                ..WindowConfig::default()
            },
            search_debounce: Duration::ZERO,
        }
    }

    fn listing(args: Vec<&str>) -> Result<(Vec<String>, serde_json::Value)> {
        let options = parse_cli_args(args, default_options_path())?;
        let mut out = Vec::new();
        run_listing(&options, fast_options(), &mut out)?;

        let text = String::from_utf8(out)?;
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
        let summary = lines.pop().expect("summary line");
        Ok((lines, serde_json::from_str(&summary)?))
    }

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/tally-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
                entity: EntityKind::Clients,
                data_path: None,
                demo_count: None,
                search: None,
                sort_clicks: Vec::new(),
                reveals: 0,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_table_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--entity", "payments", "--demo", "40", "--search", "Zuñiga", "--sort",
                "amount", "--sort", "amount", "--reveal", "3",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.entity, EntityKind::Payments);
        assert_eq!(options.demo_count, Some(40));
        assert_eq!(options.search.as_deref(), Some("Zuñiga"));
        assert_eq!(options.sort_clicks, vec!["amount", "amount"]);
        assert_eq!(options.reveals, 3);
        Ok(())
    }

    #[test]
    fn parse_cli_args_demo_count_is_optional() -> Result<()> {
        let trailing = parse_cli_args(vec!["--demo"], default_options_path())?;
        assert_eq!(trailing.demo_count, Some(DEFAULT_DEMO_COUNT));

        let before_flag = parse_cli_args(vec!["--demo", "--reveal", "1"], default_options_path())?;
        assert_eq!(before_flag.demo_count, Some(DEFAULT_DEMO_COUNT));
        assert_eq!(before_flag.reveals, 1);
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_values() {
        let error = parse_cli_args(vec!["--entity", "modems"], default_options_path())
            .expect_err("unknown entity should fail");
        assert!(error.to_string().contains("clients, payments"));

        let error = parse_cli_args(vec!["--reveal", "lots"], default_options_path())
            .expect_err("non-numeric reveal should fail");
        assert!(error.to_string().contains("--reveal count"));

        let error = parse_cli_args(vec!["--demo", "many"], default_options_path())
            .expect_err("non-numeric demo count should fail");
        assert!(error.to_string().contains("--demo count"));
    }

    #[test]
    fn parse_cli_args_rejects_two_record_sources() {
        let error = parse_cli_args(
            vec!["--data", "clients.json", "--demo"],
            default_options_path(),
        )
        .expect_err("two sources should fail");
        assert!(error.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn load_snapshot_reads_written_records() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut faker = tally_testkit::IspFaker::new(3);
        let clients = faker.clients(4);
        let path = tally_testkit::write_snapshot(temp.path(), "clients.json", &clients)?;

        let loaded: Vec<Client> = load_snapshot(&path)?;
        assert_eq!(loaded, clients);
        Ok(())
    }

    #[test]
    fn load_snapshot_reports_the_path_on_bad_json() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{\"id\": 1}")?;

        let error = load_snapshot::<Client>(&path).expect_err("object is not an array");
        assert!(error.to_string().contains("broken.json"));
        Ok(())
    }

    #[test]
    fn listing_prints_rows_then_summary_after_reveal() -> Result<()> {
        let (rows, summary) = listing(vec!["--demo", "120", "--reveal", "1"])?;

        assert_eq!(rows.len(), 120);
        for row in &rows {
            let _: Client = serde_json::from_str(row)?;
        }
        assert_eq!(summary["entity"], "clients");
        assert_eq!(summary["visible"], 120);
        assert_eq!(summary["matches"], 120);
        assert_eq!(summary["records"], 120);
        assert_eq!(summary["search"], "");
        assert_eq!(summary["sort"]["field"], "name");
        assert_eq!(summary["sort"]["direction"], "asc");
        assert_eq!(summary["reached_end"], true);
        Ok(())
    }

    #[test]
    fn listing_without_reveal_stops_at_baseline() -> Result<()> {
        let (rows, summary) = listing(vec!["--demo", "120"])?;
        assert_eq!(rows.len(), 100);
        assert_eq!(summary["visible"], 100);
        assert_eq!(summary["matches"], 120);
        assert_eq!(summary["reached_end"], false);
        Ok(())
    }

    #[test]
    fn listing_applies_sort_clicks_in_order() -> Result<()> {
        let (rows, summary) = listing(vec![
            "--entity", "payments", "--demo", "40", "--sort", "amount", "--sort", "amount",
        ])?;

        let amounts = rows
            .iter()
            .map(|row| serde_json::from_str::<Payment>(row).map(|payment| payment.amount))
            .collect::<Result<Vec<f64>, _>>()?;
        assert_eq!(amounts.len(), 40);
        assert!(amounts.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(summary["entity"], "payments");
        assert_eq!(summary["sort"]["field"], "amount");
        assert_eq!(summary["sort"]["direction"], "desc");
        assert_eq!(summary["reached_end"], false);
        Ok(())
    }

    #[test]
    fn listing_rejects_unknown_sort_field() {
        let error = listing(vec!["--entity", "payments", "--demo", "5", "--sort", "balance"])
            .expect_err("payments have no balance column");
        assert!(format!("{error:#}").contains("cannot sort by \"balance\""));
    }

    #[test]
    fn tally_log_takes_priority_over_config_filter() -> Result<()> {
        let filter = log_filter(Some("tally_table=trace".to_owned()), "warn")?;
        assert!(filter.to_string().contains("tally_table=trace"));
        assert!(!filter.to_string().contains("warn"));

        let fallback = log_filter(None, "warn")?;
        assert_eq!(fallback.to_string(), "warn");

        let blank = log_filter(Some("  ".to_owned()), "info")?;
        assert_eq!(blank.to_string(), "info");
        Ok(())
    }

    #[test]
    fn invalid_tally_log_is_reported() {
        let error = log_filter(Some("tally=loud".to_owned()), "warn")
            .expect_err("bad env filter should fail");
        assert!(error.to_string().contains("TALLY_LOG"));
    }
}
