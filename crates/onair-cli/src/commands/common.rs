//! Shared CLI helpers used across multiple commands.

use onair_config::{TemplateFile, find_template, get_factory_template};
use onair_core::{Attr, GeoId, PublishedTemplate, TemplateDecl};

/// Load a template by factory name, user template name, or file path.
pub fn load_template(name: &str) -> anyhow::Result<TemplateDecl> {
    if let Some(file) = get_factory_template(name) {
        return Ok(file.to_decl()?);
    }

    if let Some(path) = find_template(name) {
        return Ok(TemplateFile::load(&path)?.to_decl()?);
    }

    anyhow::bail!(
        "Template '{}' not found. Use 'onair templates' to see available templates.",
        name
    )
}

/// One printed value.
pub struct ValueRow {
    pub geo: GeoId,
    pub attr: Attr,
    pub value: i32,
}

impl ValueRow {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "geo": self.geo,
            "attr": self.attr.name(),
            "value": self.value,
        })
    }
}

/// The blended pairs of a published template at one keyframe.
pub fn frame_rows(published: &PublishedTemplate, frame: usize) -> Vec<ValueRow> {
    published
        .blend_pairs()
        .iter()
        .filter_map(|&(geo, attr)| {
            published
                .value(geo, attr, frame)
                .map(|value| ValueRow { geo, attr, value })
        })
        .collect()
}

/// Print rows as an aligned table, marking keyframed pairs.
pub fn print_rows(published: &PublishedTemplate, rows: &[ValueRow]) {
    println!("  {:>4}  {:<10} {:>8}", "geo", "attr", "value");
    for row in rows {
        let marker = if published.is_tracked(row.geo, row.attr) {
            " *"
        } else {
            ""
        };
        println!(
            "  {:>4}  {:<10} {:>8}{}",
            row.geo,
            row.attr.name(),
            row.value,
            marker
        );
    }
}
