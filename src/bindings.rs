//! TypeScript bindings for the web frontend.

use crate::config::LogLevel;
use crate::geometry::Geometry;
use crate::lifecycle::{LifecycleEvent, ResolvedState};
use crate::registry::SectionDescriptor;
use crate::tracker::TrackerSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<()> {
    T::export_all_to(out_dir).with_context(|| format!("Failed to export {}", T::name()))
}

/// Regenerate every `.ts` binding in `out_dir`, removing stale ones first.
pub fn export_ts_bindings(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for entry in
        fs::read_dir(out_dir).with_context(|| format!("Failed to list {}", out_dir.display()))?
    {
        let path = entry.context("Failed to read entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    export_single_type::<LogLevel>(out_dir)?;
    export_single_type::<Geometry>(out_dir)?;
    export_single_type::<SectionDescriptor>(out_dir)?;
    export_single_type::<ResolvedState>(out_dir)?;
    export_single_type::<LifecycleEvent>(out_dir)?;
    export_single_type::<TrackerSnapshot>(out_dir)?;

    let index_content = r#"export type { LogLevel } from "./LogLevel";
export type { Geometry } from "./Geometry";
export type { SectionDescriptor } from "./SectionDescriptor";
export type { ResolvedState } from "./ResolvedState";
export type { LifecycleEvent } from "./LifecycleEvent";
export type { TrackerSnapshot } from "./TrackerSnapshot";
"#;
    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index_content)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;
    info!(path = %out_dir.display(), "Exported TS bindings");
    Ok(())
}
