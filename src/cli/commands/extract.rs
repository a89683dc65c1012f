//! One-shot processing command.

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::pipeline::{ImageUpload, InputBundle, Pipeline};

/// Run the pipeline once and print the response as JSON on stdout.
pub async fn cmd_extract(
    config: &Config,
    image: Option<&Path>,
    text: Option<String>,
    pretty: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    let upload = match image {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Some(ImageUpload::new(file_name, bytes))
        }
        None => None,
    };

    let response = pipeline.process(InputBundle::new(upload, text)).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    Ok(())
}
