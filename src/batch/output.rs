use std::{fs, path::Path};

use log::{info, warn};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use super::{
    config::BatchConfig,
    consts::{KMAP_DIR, SCHEMATIC_DIR},
    job::Batch,
};
use crate::{error::Result, schematic::Grid};

/// Removes every file below `dir`, keeping the directories themselves. Files that cannot be
/// removed are logged and skipped.
pub fn clear_output(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let result = match entry.file_type() {
            Ok(kind) if kind.is_dir() => {
                clear_output(&path);
                Ok(())
            }
            Ok(_) => fs::remove_file(&path),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to delete {}: {}", path.display(), e);
        }
    }
}

/// Text rendering of one version: a `#n` tag above the rotated, scaled schematic.
pub fn schematic_text(grid: &Grid, number: usize, scale: usize) -> String {
    let mut text = format!("#{}\n", number);
    for line in grid.rotated_lines(scale) {
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text
}

/// Writes one Karnaugh map and one schematic per version, numbered from 1, plus a binary
/// snapshot of the whole batch.
pub fn save_batch(batch: &Batch, config: &BatchConfig) -> Result<()> {
    let root = Path::new(&config.output_dir);

    let kmap_dir = root.join(KMAP_DIR);
    let schematic_dir = root.join(SCHEMATIC_DIR);
    fs::create_dir_all(&kmap_dir)?;
    fs::create_dir_all(&schematic_dir)?;

    batch
        .versions
        .par_iter()
        .zip(batch.maps.par_iter())
        .map(|(version, map)| -> Result<()> {
            let number = version.index + 1;
            let name = format!("{} #{}.txt", config.file_name, number);
            fs::write(kmap_dir.join(&name), map.to_string())?;
            fs::write(
                schematic_dir.join(&name),
                schematic_text(&version.grid, number, config.scale),
            )?;
            Ok(())
        })
        .collect::<Result<()>>()?;

    let snapshot = root.join(format!("{}.bin", config.file_name));
    batch.save_as_binary(&snapshot.to_string_lossy())?;

    info!(
        "Saved {} versions to {}",
        batch.versions.len(),
        root.display()
    );
    Ok(())
}
