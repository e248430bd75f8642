//! Main entry point for the attar CLI application.
//!
//! This binary lists, previews and downloads attachments packed inside a
//! model storage object, served from the local filesystem or an HTTP
//! bucket.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use attar::{
    BucketClient, Cli, FileIndex, FileNode, FilePreview, HttpRangeReader, LocalFileReader,
    ModelAttachments, PreviewState, ReadAt,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let model_index = load_model_index(&cli.model_index_source()).await?;

    if cli.is_http_url() {
        // Remote bucket via HTTP Range requests
        let reader = HttpRangeReader::new(cli.object.clone()).await?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        process_attachments(reader.clone(), &model_index, &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.object))?);
        process_attachments(reader, &model_index, &cli).await?;
    }

    Ok(())
}

/// Fetch and parse the model-level file index.
///
/// The index is a small standalone JSON document, so it is read whole:
/// plain GET for URLs, a filesystem read otherwise.
async fn load_model_index(source: &str) -> Result<FileIndex> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::get(source)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("cannot read model index {source}"))?
    };

    serde_json::from_slice(&bytes).with_context(|| format!("{source} is not a valid file index"))
}

/// Process the attachments archive based on CLI options.
///
/// - List mode (`-l`, `-v`, or no file arguments): display the tree
/// - Otherwise: preview or download each requested attachment
async fn process_attachments<R: ReadAt + 'static>(
    reader: Arc<R>,
    model_index: &FileIndex,
    cli: &Cli,
) -> Result<()> {
    let client = Arc::new(BucketClient::new(reader));

    let Some(attachments) = ModelAttachments::init(client.as_ref(), model_index).await? else {
        if !cli.is_quiet() {
            eprintln!("Model has no attachments archive");
        }
        return Ok(());
    };

    if attachments.is_empty() {
        if !cli.is_quiet() {
            eprintln!("Attachments archive is empty");
        }
        return Ok(());
    }

    // List mode: display the attachment tree and exit
    if cli.list || cli.verbose || cli.files.is_empty() {
        print_tree(attachments.tree(), cli.verbose);
        return Ok(());
    }

    let preview = FilePreview::new(client);
    let multiple_files = cli.pipe && cli.files.len() > 1;

    for path in &cli.files {
        let Some(node) = attachments.find_file(path) else {
            if !cli.is_quiet() {
                eprintln!("Skipping: {path} (not in attachments)");
            }
            continue;
        };

        preview
            .select(Some(node), attachments.index(), attachments.tar_base_offset())
            .await;
        let slot = preview.slot().await;

        if slot.state != PreviewState::Idle {
            if !cli.is_quiet() {
                eprintln!(
                    "Skipping: {path} ({})",
                    slot.error.as_deref().unwrap_or("preview failed")
                );
            }
            continue;
        }

        if let Some(dir) = &cli.download_dir {
            let output_path = preview.download_to(Path::new(dir)).await?;
            if !cli.is_quiet() {
                println!(" downloading: {path} -> {}", output_path.display());
            }
            continue;
        }

        let Some(content) = &slot.content else {
            continue;
        };

        if multiple_files {
            println!("--- {path} ---");
        }
        if let Some(text) = &content.text {
            print!("{text}");
        } else if cli.pipe {
            // Binary preview goes raw to the pipe
            use tokio::io::AsyncWriteExt;
            tokio::io::stdout().write_all(&content.blob).await?;
        } else if !cli.is_quiet() {
            eprintln!(
                "{path}: {} bytes of {:?} content (use -d to save, -p to pipe)",
                content.blob.len(),
                content.file_type
            );
        }
    }

    Ok(())
}

/// Print the attachment tree, one node per line, indented by depth.
///
/// Verbose mode prefixes files with their size and appends a summary.
fn print_tree(nodes: &[FileNode], verbose: bool) {
    fn walk(nodes: &[FileNode], depth: usize, verbose: bool, totals: &mut (u64, usize)) {
        let indent = "  ".repeat(depth);
        for node in nodes {
            match node {
                FileNode::File { name, size, .. } => {
                    if verbose {
                        println!("{:>10}  {indent}{name}", size);
                    } else {
                        println!("{indent}{name}");
                    }
                    totals.0 += size;
                    totals.1 += 1;
                }
                FileNode::Folder { name, children } => {
                    if verbose {
                        println!("{:>10}  {indent}{name}/", "");
                    } else {
                        println!("{indent}{name}/");
                    }
                    walk(children, depth + 1, verbose, totals);
                }
            }
        }
    }

    if verbose {
        println!("{:>10}  Name", "Length");
        println!("{}", "-".repeat(40));
    }

    let mut totals = (0u64, 0usize);
    walk(nodes, 0, verbose, &mut totals);

    if verbose {
        println!("{}", "-".repeat(40));
        println!("{:>10}  {} files", totals.0, totals.1);
    }
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
