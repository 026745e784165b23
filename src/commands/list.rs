use crate::core::config::Config;
use crate::core::manifest::ModelSet;
use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetStatus {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub target_dir: PathBuf,
    pub complete: bool,
    /// Files (or the archive marker) not yet on disk.
    pub missing: Vec<String>,
}

pub fn list_sets(config: &Config, root: Option<&Path>, json: bool) -> Result<()> {
    let root = root.unwrap_or(&config.models_root);
    let statuses = set_statuses(config, root);

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No model sets configured.");
        return Ok(());
    }

    println!("Model sets (root: {}):", root.display());
    println!();

    for status in &statuses {
        let marker = if status.complete { "✅" } else { "⬜" };
        println!("  {marker} {} [{}]", status.name, status.kind);
        if let Some(description) = &status.description {
            println!("      {description}");
        }
        println!("      {}", status.target_dir.display());
        if !status.complete && !status.missing.is_empty() {
            println!("      missing: {}", status.missing.join(", "));
        }
    }

    println!();
    println!("To download a set, run:");
    println!("  mtfetch fetch <name>");

    Ok(())
}

pub fn set_statuses(config: &Config, root: &Path) -> Vec<SetStatus> {
    config.sets.iter().map(|set| status_of(set, root)).collect()
}

fn status_of(set: &ModelSet, root: &Path) -> SetStatus {
    let target_dir = set.target_dir(root);
    let missing = match &set.archive {
        Some(archive) if !target_dir.join(&archive.marker).exists() => vec![archive.marker.clone()],
        Some(_) => Vec::new(),
        None => set
            .files
            .iter()
            .filter(|f| !target_dir.join(&f.name).exists())
            .map(|f| f.name.clone())
            .collect(),
    };

    SetStatus {
        name: set.name.clone(),
        kind: set.kind().to_string(),
        description: set.description.clone(),
        complete: set.is_complete(root),
        target_dir,
        missing,
    }
}
