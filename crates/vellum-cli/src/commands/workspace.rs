use std::path::Path;

use vellum_core::db::{LibSqlWorkspaceRepository, WorkspaceRepository};

use crate::commands::common::{open_database, resolve_workspace};
use crate::error::CliError;

pub async fn run_workspace_list(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let repo = LibSqlWorkspaceRepository::new(db.connection());

    for workspace in repo.list().await? {
        println!("{:<24}  {}", workspace.name, workspace.id);
    }
    Ok(())
}

pub async fn run_workspace_rename(
    new_name: &str,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlWorkspaceRepository::new(db.connection());
    let renamed = repo.rename_workspace(&workspace.id, new_name).await?;

    println!("{}", renamed.name);
    Ok(())
}

pub async fn run_workspace_remove(
    confirmed: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    if !confirmed {
        return Err(CliError::RemovalNotConfirmed(workspace.name));
    }

    let repo = LibSqlWorkspaceRepository::new(db.connection());
    repo.remove_workspace(&workspace.id).await?;

    println!("{}", workspace.name);
    Ok(())
}
