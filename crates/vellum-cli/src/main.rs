//! Vellum CLI - Command-line client for the Vellum document workspace

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands, FolderCommands, ViewCommands, WorkspaceCommands};
use crate::commands::common::resolve_db_path;
use crate::commands::list::ListFilters;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vellum=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    let workspace = cli.workspace.as_deref();

    match cli.command {
        Commands::Add {
            title,
            content,
            folder,
            tags,
        } => {
            commands::add::run_add(
                &title,
                &content,
                folder.as_deref(),
                &tags,
                workspace,
                &db_path,
            )
            .await?;
        }
        Commands::List {
            limit,
            folder,
            tag,
            bookmarked,
            view,
            json,
        } => {
            let filters = ListFilters {
                folder: folder.as_deref(),
                tag: tag.as_deref(),
                bookmarked,
                view: view.as_deref(),
            };
            commands::list::run_list(limit, filters, json, workspace, &db_path).await?;
        }
        Commands::Bookmark { id, remove, team } => {
            commands::bookmark::run_bookmark(&id, remove, team.as_deref(), workspace, &db_path)
                .await?;
        }
        Commands::View { command } => match command {
            ViewCommands::Add { name, condition } => {
                commands::view::run_view_add(&name, &condition, workspace, &db_path).await?;
            }
            ViewCommands::List { json } => {
                commands::view::run_view_list(json, workspace, &db_path).await?;
            }
            ViewCommands::Remove { name } => {
                commands::view::run_view_remove(&name, workspace, &db_path).await?;
            }
        },
        Commands::Folder { command } => match command {
            FolderCommands::Add { pathname } => {
                commands::folder::run_folder_add(&pathname, workspace, &db_path).await?;
            }
            FolderCommands::List { json } => {
                commands::folder::run_folder_list(json, workspace, &db_path).await?;
            }
            FolderCommands::Rename {
                old,
                new,
                recursive,
            } => {
                commands::folder::run_folder_rename(&old, &new, recursive, workspace, &db_path)
                    .await?;
            }
            FolderCommands::Rearrange { file, dry_run } => {
                commands::folder::run_folder_rearrange(&file, dry_run, workspace, &db_path)
                    .await?;
            }
        },
        Commands::Workspace { command } => match command {
            WorkspaceCommands::List => {
                commands::workspace::run_workspace_list(&db_path).await?;
            }
            WorkspaceCommands::Rename { name } => {
                commands::workspace::run_workspace_rename(&name, workspace, &db_path).await?;
            }
            WorkspaceCommands::Remove { yes } => {
                commands::workspace::run_workspace_remove(yes, workspace, &db_path).await?;
            }
        },
        Commands::Export { format, output } => {
            commands::export::run_export(format, output.as_deref(), workspace, &db_path).await?;
        }
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
        Commands::Sync => {
            commands::sync::run_sync(&db_path).await?;
        }
    }

    Ok(())
}
