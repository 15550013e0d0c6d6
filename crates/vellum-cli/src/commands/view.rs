use std::path::Path;

use vellum_core::db::{LibSqlSmartViewRepository, SmartViewRepository};

use crate::commands::common::{open_database, parse_condition_arg, resolve_workspace};
use crate::error::CliError;

pub async fn run_view_add(
    name: &str,
    condition_arg: &str,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let condition = parse_condition_arg(condition_arg)?;

    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlSmartViewRepository::new(db.connection());
    let view = repo.create(&workspace.id, name, condition).await?;

    println!("{}", view.name);
    Ok(())
}

pub async fn run_view_list(
    as_json: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlSmartViewRepository::new(db.connection());
    let views = repo.list(&workspace.id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for view in views {
            let condition = serde_json::to_string(&view.condition)?;
            println!("{:<24}  {condition}", view.name);
        }
    }

    Ok(())
}

pub async fn run_view_remove(
    name: &str,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlSmartViewRepository::new(db.connection());
    match repo.remove(&workspace.id, name).await {
        Ok(()) => {
            println!("{name}");
            Ok(())
        }
        Err(vellum_core::Error::NotFound(_)) => Err(CliError::ViewNotFound(name.to_string())),
        Err(error) => Err(error.into()),
    }
}
