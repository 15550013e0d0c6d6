use std::path::Path;

use vellum_core::config::ClientConfig;
use vellum_core::db::{DocumentRepository, LibSqlDocumentRepository};

use crate::commands::common::{open_database, resolve_document, resolve_workspace};
use crate::error::CliError;

pub async fn run_bookmark(
    id: &str,
    remove: bool,
    team: Option<&str>,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;
    let document = resolve_document(&db, &workspace, id).await?;

    let repo = LibSqlDocumentRepository::new(db.connection());
    let updated = repo.set_bookmarked(&document.id, !remove).await?;

    if let Some(team_id) = team {
        let client = ClientConfig::from_env()
            .api_client()?
            .ok_or(CliError::ApiNotConfigured)?;
        let doc_id = updated.id.to_string();
        let response = if remove {
            client.destroy_doc_bookmark(team_id, &doc_id).await?
        } else {
            client.create_doc_bookmark(team_id, &doc_id).await?
        };
        tracing::info!(doc = %response.doc.id, bookmarked = response.doc.bookmarked, "cloud bookmark updated");
    }

    println!("{}", updated.id);
    Ok(())
}
