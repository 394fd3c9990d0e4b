//! Synthesize command

use anyhow::{Context, Result};
use roadnet_core::Vec3;
use roadnet_curve::CurveSynthesis;
use roadnet_scene::RoadCategory;
use serde::Deserialize;

#[derive(Deserialize)]
struct PointsFile {
    #[serde(default = "default_category")]
    category: RoadCategory,
    points: Vec<Vec3>,
}

fn default_category() -> RoadCategory {
    RoadCategory::CatmullSerie
}

pub fn run(path: &str, format: &str, config: Option<&str>) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let file: PointsFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path))?;

    let profile = file.category.profile();
    if !profile.accepts(file.points.len()) {
        anyhow::bail!(
            "{} does not take {} control points",
            file.category,
            file.points.len()
        );
    }

    let engine = super::load_config(config)?.engine()?;
    let line = engine.synthesize(profile.model, &file.points)?;
    tracing::info!(
        controls = line.catmull.len(),
        serie = line.serie.len(),
        "synthesized reference line"
    );

    let output = match format {
        "json" => serde_json::to_string_pretty(&line)?,
        "toml" => toml::to_string_pretty(&line)?,
        _ => anyhow::bail!("Unknown format: {}", format),
    };
    println!("{}", output);
    Ok(())
}
