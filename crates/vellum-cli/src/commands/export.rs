use std::path::Path;

use vellum_core::db::{DocumentRepository, LibSqlDocumentRepository};
use vellum_core::export::{render_json_export, render_markdown_export};
use vellum_core::Document;

use crate::cli::ExportFormat;
use crate::commands::common::{open_database, resolve_workspace};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    const PAGE_SIZE: usize = 500;

    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;
    let repo = LibSqlDocumentRepository::new(db.connection());

    let mut documents: Vec<Document> = Vec::new();
    let mut offset = 0usize;
    loop {
        let batch = repo.list(&workspace.id, PAGE_SIZE, offset).await?;
        let count = batch.len();
        documents.extend(batch);

        if count < PAGE_SIZE {
            break;
        }
        offset += count;
    }

    let rendered = match format {
        ExportFormat::Json => render_json_export(&documents)?,
        ExportFormat::Markdown => render_markdown_export(&documents),
    };

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
