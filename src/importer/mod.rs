use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use fscene_files::scene::builder::ImportDiagnostics;
use fscene_files::scene::reader::SceneDirectoryReader;
use fscene_files::scene::types::{SceneDataSet, TextureRecord};
use fscene_files::source::{FileSystemSource, TableSource};
use itertools::Itertools;
use log::{error, info, warn};

/// The result of one finished import. Immutable once published.
#[derive(Debug)]
pub struct ImportedScene {
    pub directory: PathBuf,
    /// Index 0 is the most detailed LOD. Always at least one entry.
    pub lod_sets: Vec<SceneDataSet>,
    pub diagnostics: ImportDiagnostics,
    pub elapsed: Duration,
}

impl ImportedScene {
    pub fn lod_count(&self) -> usize {
        self.lod_sets.len()
    }

    pub fn scene(&self, lod: usize) -> Option<&SceneDataSet> {
        self.lod_sets.get(lod)
    }

    /// Light and shadow maps are LOD-invariant and only stored with LOD 0.
    pub fn light_maps(&self) -> &[TextureRecord] {
        self.lod_sets
            .first()
            .map(|set| set.light_maps_and_shadow_maps.as_slice())
            .unwrap_or_default()
    }
}

/// Runs imports on a background thread and hands the results to a polling consumer.
///
/// At most one import runs at a time. When one finishes, its result is published first and `dirty`
/// is raised afterwards, so a consumer that sees `dirty` always sees the complete result. The
/// consumer lowers `dirty` again once it picked the result up; the importer never does.
pub struct SceneImporter {
    source: Arc<dyn TableSource>,
    busy: AtomicBool,
    dirty: AtomicBool,
    imported: ArcSwapOption<ImportedScene>,
}

impl SceneImporter {
    pub fn new() -> Self {
        Self::with_source(Arc::new(FileSystemSource))
    }

    pub fn with_source(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            busy: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            imported: ArcSwapOption::empty(),
        }
    }

    /// Starts importing `dir` unless an import is already running, in which case the request is
    /// dropped and `None` is returned.
    pub fn request_import(self: &Arc<Self>, dir: PathBuf) -> Option<JoinHandle<()>> {
        let Some(guard) = BusyGuard::acquire(self) else {
            warn!("Import of {} ignored, another import is still running", dir.display());
            return None;
        };

        let spawned = std::thread::Builder::new()
            .name("Importer".into())
            .spawn(move || {
                // busy stays set until the result is published
                guard.importer.import(dir);
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                // The closure, and with it the guard, is gone already.
                error!("Failed to spawn the importer thread: {}", err);
                None
            }
        }
    }

    fn import(&self, dir: PathBuf) {
        profiling::scope!("SceneImporter::import");
        info!("Importing {}", dir.display());

        let started = Instant::now();
        let import = SceneDirectoryReader::read(self.source.as_ref(), &dir);
        let elapsed = started.elapsed();

        info!(
            "Imported {} in {:.2?}: {}",
            dir.display(),
            elapsed,
            import
                .lod_sets
                .iter()
                .enumerate()
                .map(|(lod, set)| format!(
                    "LOD{} {} static / {} skeletal meshes",
                    lod,
                    set.static_meshes.len(),
                    set.skeletal_meshes.len()
                ))
                .join(", ")
        );
        if !import.diagnostics.is_clean() {
            warn!("Import of {} was incomplete, see the warnings above", dir.display());
        }

        self.publish(Some(Arc::new(ImportedScene {
            directory: dir,
            lod_sets: import.lod_sets,
            diagnostics: import.diagnostics,
            elapsed,
        })));
    }

    fn publish(&self, scene: Option<Arc<ImportedScene>>) {
        self.imported.store(scene);
        self.dirty.store(true, Ordering::Release);
    }

    /// Drops the current scene. The consumer is notified like for a finished import.
    pub fn clear(&self) {
        info!("Clearing the imported scene");
        self.publish(None);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Lowers `dirty` and returns whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn imported(&self) -> Option<Arc<ImportedScene>> {
        self.imported.load_full()
    }
}

impl Default for SceneImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds `busy` for one import and releases it when dropped, also when the import panics.
struct BusyGuard {
    importer: Arc<SceneImporter>,
}

impl BusyGuard {
    fn acquire(importer: &Arc<SceneImporter>) -> Option<Self> {
        importer
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                importer: importer.clone(),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.importer.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests;
