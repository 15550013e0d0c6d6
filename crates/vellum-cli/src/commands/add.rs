use std::path::Path;

use vellum_core::db::{DocumentRepository, FolderRepository, LibSqlDocumentRepository, LibSqlFolderRepository};
use vellum_core::Document;

use crate::commands::common::{open_database, resolve_workspace};
use crate::error::CliError;

pub async fn run_add(
    title: &str,
    content_parts: &[String],
    folder: Option<&str>,
    tags: &[String],
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CliError::EmptyTitle);
    }

    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let folder_pathname = match folder {
        None => "/".to_string(),
        Some("/") => "/".to_string(),
        Some(pathname) => {
            // Ensure the folder exists before filing the document into it.
            let folders = LibSqlFolderRepository::new(db.connection());
            folders.create_folder(&workspace.id, pathname).await?.pathname
        }
    };

    let mut document = Document::new(workspace.id, title, content_parts.join(" "), folder_pathname);
    for tag in tags {
        document.add_tag(tag);
    }

    let repo = LibSqlDocumentRepository::new(db.connection());
    repo.create(&document).await?;

    println!("{}", document.id);
    Ok(())
}
