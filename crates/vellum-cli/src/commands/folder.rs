use std::path::Path;

use vellum_core::db::{FolderRepository, LibSqlFolderRepository};
use vellum_core::tree::{
    build_folder_tree, rearrange_folders, FolderStore, FolderTreeNode, RearrangeOutcome,
    RearrangementGate,
};

use crate::commands::common::{open_database, resolve_workspace};
use crate::error::CliError;

pub async fn run_folder_add(
    pathname: &str,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlFolderRepository::new(db.connection());
    let folder = repo.create_folder(&workspace.id, pathname).await?;

    println!("{}", folder.pathname);
    Ok(())
}

pub async fn run_folder_list(
    as_json: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlFolderRepository::new(db.connection());
    let folders = repo.list_folders(&workspace.id).await?;
    let tree = build_folder_tree(&folders);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        for line in render_tree_lines(&tree, 0) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_folder_rename(
    old_pathname: &str,
    new_pathname: &str,
    recursive: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlFolderRepository::new(db.connection());
    let current = repo
        .get_folder(&workspace.id, old_pathname)
        .await?
        .ok_or_else(|| vellum_core::Error::NotFound(old_pathname.to_string()))?;

    repo.rename_folder(
        &workspace.id,
        old_pathname,
        new_pathname,
        recursive,
        current.display_order,
    )
    .await?;

    println!("{new_pathname}");
    Ok(())
}

pub async fn run_folder_rearrange(
    tree_file: &Path,
    dry_run: bool,
    workspace_name: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let payload = std::fs::read_to_string(tree_file)?;
    let tree: Vec<FolderTreeNode> = serde_json::from_str(&payload)?;

    let db = open_database(db_path).await?;
    let workspace = resolve_workspace(&db, workspace_name).await?;

    let repo = LibSqlFolderRepository::new(db.connection());
    let folders = repo.list_folders(&workspace.id).await?;

    if dry_run {
        vellum_core::tree::validate_folder_tree(&tree)?;
        let updates = vellum_core::tree::plan_rearrangement(&folders, &tree)?;
        println!("{}", serde_json::to_string_pretty(&updates)?);
        return Ok(());
    }

    let mut gate = RearrangementGate::default();
    match rearrange_folders(&mut gate, &repo, &workspace.id, &folders, &tree).await? {
        RearrangeOutcome::Applied(updates) => {
            println!("applied {} folder update(s)", updates.len());
            Ok(())
        }
        RearrangeOutcome::AlreadyRearranging => Err(CliError::RearrangementInFlight),
    }
}

fn render_tree_lines(nodes: &[FolderTreeNode], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for node in nodes {
        let name = vellum_core::models::folder_name(&node.pathname);
        lines.push(format!("{}{name}", "  ".repeat(depth)));
        lines.extend(render_tree_lines(&node.children, depth + 1));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_tree_lines_indents_children() {
        let tree = vec![
            FolderTreeNode {
                pathname: "/projects".to_string(),
                children: vec![FolderTreeNode::leaf("/projects/alpha")],
            },
            FolderTreeNode::leaf("/personal"),
        ];

        assert_eq!(
            render_tree_lines(&tree, 0),
            vec!["projects", "  alpha", "personal"]
        );
    }

    #[test]
    fn tree_file_format_round_trips() {
        let tree = vec![FolderTreeNode {
            pathname: "/projects".to_string(),
            children: vec![FolderTreeNode::leaf("/projects/alpha")],
        }];

        let payload = serde_json::to_string(&tree).unwrap();
        let parsed: Vec<FolderTreeNode> = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed, tree);

        // Children may be omitted entirely in hand-written files.
        let sparse: Vec<FolderTreeNode> =
            serde_json::from_str(r#"[{"pathname": "/personal"}]"#).unwrap();
        assert_eq!(sparse, vec![FolderTreeNode::leaf("/personal")]);
    }
}
