//! Attach files example
//!
//! Uploads the given files, waits for their previews, then creates an
//! article that references them. Pass `--cleanup` to delete the uploads
//! again instead of creating the article.
//!
//! ```bash
//! cargo run --example attach_files -- notes.pdf diagram.png
//! cargo run --example attach_files -- --cleanup notes.pdf
//! ```
//!
//! Requires a saved session; run `browse_articles` first to log in.

use examprep_client::{
    ArticleDraft, Attachments, Config, Dashboard, PreviewMaterializer, PreviewStatus, UploadFile,
    connect,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cleanup = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--cleanup" {
            cleanup = true;
        } else {
            paths.push(arg);
        }
    }
    if paths.is_empty() {
        eprintln!("usage: attach_files [--cleanup] <file>...");
        return Ok(());
    }

    let config = Config::from_env()?;
    let api = connect(&config)?;
    if !api.is_authenticated() {
        eprintln!("Not logged in");
        return Ok(());
    }

    let mut uploads = Vec::new();
    for path in &paths {
        match UploadFile::from_path(path).await {
            Ok(file) => uploads.push(file),
            Err(e) => eprintln!("Skipping {path}: {}", e.user_message("cannot read file")),
        }
    }

    let materializer = PreviewMaterializer::in_temp_dir()?;
    let mut attachments = Attachments::new(api.clone(), materializer.clone());
    let stored = match attachments.upload(uploads).await {
        Ok(stored) => stored,
        Err(e) => {
            eprintln!("{}", e.user_message("Upload failed"));
            return Ok(());
        }
    };
    attachments.settle().await;

    for name in attachments.files() {
        let Some(preview) = attachments.preview(name) else {
            continue;
        };
        match preview.status() {
            PreviewStatus::Ready { kind, path } => {
                println!("{name}: {kind:?} preview at {}", path.display());
            }
            PreviewStatus::Loading => println!("{name}: still loading"),
            PreviewStatus::Unavailable => println!("{name}"),
        }
    }

    if cleanup {
        for name in &stored {
            if let Err(e) = attachments.delete(name).await {
                eprintln!("{name}: {}", e.user_message("Failed to delete file"));
            }
        }
        println!("{} preview handles still live", materializer.live_handles());
        return Ok(());
    }

    let mut draft = ArticleDraft {
        title: "Uploaded files".to_string(),
        subject: "other".to_string(),
        content: stored
            .iter()
            .map(|name| format!("- {name}"))
            .collect::<Vec<_>>()
            .join("\n"),
        ..Default::default()
    };
    draft.files = attachments.into_files();

    let dashboard = Dashboard::new(api);
    match dashboard.submit(&mut draft).await {
        Ok(article) => println!("Created article {} with {} files", article.id, article.files.len()),
        Err(e) => eprintln!("{}", e.user_message("Failed to save article")),
    }

    Ok(())
}
