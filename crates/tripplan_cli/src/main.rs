//! Command-line entry point for the trip planner core.
//!
//! # Responsibility
//! - Verify `tripplan_core` linkage and storage bootstrap.
//! - Inspect stored projects and query the catalog through the shared cache.
//!
//! Configuration comes from `TRIPPLAN_*` environment variables.

use std::process::ExitCode;
use std::sync::Arc;
use tripplan_core::db::open_db;
use tripplan_core::{
    init_logging_from_config, CoreConfig, HttpCatalogProvider, ProjectService,
    SqliteTravelRepository, ValidationCache,
};
use uuid::Uuid;

const USAGE: &str =
    "usage: tripplan_cli <ping|version|projects|project <id>|check-place <external_id>>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let command = args.first().map(String::as_str).unwrap_or("ping");
    match command {
        "ping" => {
            println!("tripplan_core ping={}", tripplan_core::ping());
            Ok(())
        }
        "version" => {
            println!("tripplan_core version={}", tripplan_core::core_version());
            Ok(())
        }
        "projects" => with_projects(|projects| {
            let listed = projects.list_projects().map_err(|err| err.to_string())?;
            print_json(&listed)
        }),
        "project" => {
            let project_id = parse_arg::<Uuid>(args, "project id")?;
            with_projects(|projects| {
                let project = projects
                    .get_project(project_id)
                    .map_err(|err| format!("{} ({})", err, err.error_code()))?;
                print_json(&project)
            })
        }
        "check-place" => {
            let external_id = parse_arg::<i64>(args, "external id")?;
            let config = load_config()?;
            let cache = ValidationCache::with_capacity(
                HttpCatalogProvider::new(config.catalog_api_base, config.catalog_timeout),
                config.cache_capacity,
            );
            let valid = cache.is_valid_place(external_id);
            log::info!(
                "event=cli_check_place module=cli status=ok external_id={external_id} valid={valid}"
            );
            println!("external_id={external_id} valid={valid}");
            Ok(())
        }
        other => Err(format!("unknown command `{other}`\n{USAGE}")),
    }
}

fn load_config() -> Result<CoreConfig, String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;
    Ok(config)
}

type CliProjectService<'conn> = ProjectService<SqliteTravelRepository<'conn>, HttpCatalogProvider>;

fn with_projects<F>(op: F) -> Result<(), String>
where
    F: FnOnce(&CliProjectService<'_>) -> Result<(), String>,
{
    let config = load_config()?;
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let repo = SqliteTravelRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let cache = Arc::new(ValidationCache::with_capacity(
        HttpCatalogProvider::new(config.catalog_api_base.clone(), config.catalog_timeout),
        config.cache_capacity,
    ));
    let projects = ProjectService::new(repo, cache, config.place_limits());
    op(&projects)
}

fn parse_arg<T: std::str::FromStr>(args: &[String], what: &str) -> Result<T, String> {
    let raw = args
        .get(1)
        .ok_or_else(|| format!("missing {what}\n{USAGE}"))?;
    raw.parse::<T>().map_err(|_| format!("invalid {what} `{raw}`"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}
