use std::path::Path;

use vellum_core::db::{
    Database, DocumentRepository, LibSqlDocumentRepository, LibSqlSmartViewRepository,
    SmartViewRepository,
};
use vellum_core::models::Condition;
use vellum_core::query;
use vellum_core::{Document, Workspace};

use crate::commands::common::{
    document_to_list_item, format_document_lines, open_database, resolve_workspace, DocListItem,
};
use crate::error::CliError;

/// Filters selected on the command line, combined into one condition.
pub struct ListFilters<'a> {
    pub folder: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub bookmarked: bool,
    pub view: Option<&'a str>,
}

pub async fn run_list(
    limit: usize,
    filters: ListFilters<'_>,
    as_json: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let condition = build_condition(&db, &workspace, &filters).await?;
    let documents = list_all_documents(&db, &workspace).await?;
    let selected: Vec<&Document> = query::filter(&condition, &documents).take(limit).collect();

    if as_json {
        let json_items = selected
            .iter()
            .map(|document| document_to_list_item(document))
            .collect::<Vec<DocListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        let owned: Vec<Document> = selected.into_iter().cloned().collect();
        for line in format_document_lines(&owned) {
            println!("{line}");
        }
    }

    Ok(())
}

/// Combine the CLI flags (and an optional saved view) into one condition.
async fn build_condition(
    db: &Database,
    workspace: &Workspace,
    filters: &ListFilters<'_>,
) -> Result<Condition, CliError> {
    let mut conditions = Vec::new();

    if let Some(view_name) = filters.view {
        let views = LibSqlSmartViewRepository::new(db.connection());
        let view = views
            .get_by_name(&workspace.id, view_name)
            .await?
            .ok_or_else(|| CliError::ViewNotFound(view_name.to_string()))?;
        conditions.push(view.condition);
    }
    if let Some(pathname) = filters.folder {
        conditions.push(Condition::InFolder {
            pathname: pathname.to_string(),
        });
    }
    if let Some(tag) = filters.tag {
        conditions.push(Condition::Tag {
            tag: tag.to_string(),
        });
    }
    if filters.bookmarked {
        conditions.push(Condition::Bookmarked { bookmarked: true });
    }

    Ok(Condition::And { conditions })
}

async fn list_all_documents(
    db: &Database,
    workspace: &Workspace,
) -> Result<Vec<Document>, CliError> {
    const PAGE_SIZE: usize = 500;

    let repo = LibSqlDocumentRepository::new(db.connection());

    let mut documents = Vec::new();
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

    Ok(documents)
}
