use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use fscene_files::ParserError;
use fscene_files::source::{FileSystemSource, TableSource};

use crate::importer::SceneImporter;

/// Reads through to the file system, but holds every file read until opened and then takes its
/// time.
struct SlowSource {
    delay: Duration,
    open: AtomicBool,
    reads: AtomicUsize,
}

impl SlowSource {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            open: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    fn open(&self) {
        self.open.store(true, Ordering::Release);
    }
}

impl TableSource for SlowSource {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, ParserError> {
        FileSystemSource.list_files(dir)
    }

    fn read_lines(&self, dir: &Path, file_name: &str) -> Result<Vec<String>, ParserError> {
        while !self.open.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(1));
        }
        std::thread::sleep(self.delay);
        self.reads.fetch_add(1, Ordering::AcqRel);
        FileSystemSource.read_lines(dir, file_name)
    }
}

fn scene_dir(name: &str) -> Result<PathBuf, anyhow::Error> {
    Ok(std::env::current_dir()?.join("fscene-files").join("test-data").join(name))
}

#[test_log::test]
fn second_request_is_rejected_while_busy() -> Result<(), anyhow::Error> {
    let source = Arc::new(SlowSource::new(Duration::ZERO));
    let importer = Arc::new(SceneImporter::with_source(source.clone()));

    let handle = importer
        .request_import(scene_dir("World_Foo")?)
        .ok_or_else(|| anyhow::anyhow!("first request rejected"))?;
    assert!(importer.is_busy());
    assert!(importer.request_import(scene_dir("World_Cube")?).is_none());

    source.open();
    handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;

    assert!(!importer.is_busy());
    assert!(importer.is_dirty());
    let scene = importer.imported().ok_or_else(|| anyhow::anyhow!("nothing published"))?;
    assert!(scene.directory.ends_with("World_Foo"));
    assert_eq!(scene.lod_count(), 3);

    // idle again, so the next request goes through
    let handle = importer
        .request_import(scene_dir("World_Cube")?)
        .ok_or_else(|| anyhow::anyhow!("request after completion rejected"))?;
    handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;
    let scene = importer.imported().ok_or_else(|| anyhow::anyhow!("nothing published"))?;
    assert_eq!(scene.lod_count(), 1);
    assert_eq!(scene.scene(0).map(|set| set.static_meshes.len()), Some(1));

    Ok(())
}

#[test_log::test]
fn dirty_only_after_complete_publish() -> Result<(), anyhow::Error> {
    let source = Arc::new(SlowSource::new(Duration::from_millis(5)));
    let importer = Arc::new(SceneImporter::with_source(source.clone()));

    let handle = importer
        .request_import(scene_dir("World_Foo")?)
        .ok_or_else(|| anyhow::anyhow!("request rejected"))?;
    assert!(importer.imported().is_none());
    assert!(!importer.is_dirty());
    source.open();

    // Poll like the render loop does.
    loop {
        if importer.take_dirty() {
            let scene = importer
                .imported()
                .ok_or_else(|| anyhow::anyhow!("dirty without a scene"))?;
            assert_eq!(source.reads.load(Ordering::Acquire), 10);
            assert_eq!(scene.lod_count(), 3);
            let lod0 = scene.scene(0).ok_or_else(|| anyhow::anyhow!("no LOD 0"))?;
            assert_eq!(lod0.static_meshes.len(), 3);
            assert_eq!(lod0.bounds.len(), 2);
            assert_eq!(lod0.textures.len(), 2);
            assert_eq!(scene.light_maps().len(), 1);
            assert!(scene.scene(3).is_none());
            break;
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;
    // the importer never raises dirty twice for one import
    assert!(!importer.is_dirty());

    Ok(())
}

#[test_log::test]
fn missing_directory_still_signals() -> Result<(), anyhow::Error> {
    let importer = Arc::new(SceneImporter::new());

    let handle = importer
        .request_import(scene_dir("World_Missing")?)
        .ok_or_else(|| anyhow::anyhow!("request rejected"))?;
    handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;

    assert!(importer.is_dirty());
    let scene = importer.imported().ok_or_else(|| anyhow::anyhow!("nothing published"))?;
    assert_eq!(scene.lod_count(), 1);
    assert!(scene.scene(0).is_some_and(|set| set.is_empty()));
    assert!(scene.diagnostics.directory_error.is_some());

    Ok(())
}

#[test_log::test]
fn clear_drops_scene_and_notifies() -> Result<(), anyhow::Error> {
    let importer = Arc::new(SceneImporter::new());
    let handle = importer
        .request_import(scene_dir("World_Cube")?)
        .ok_or_else(|| anyhow::anyhow!("request rejected"))?;
    handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;

    importer.clear_dirty();
    assert!(importer.imported().is_some());

    importer.clear();
    assert!(importer.is_dirty());
    assert!(importer.imported().is_none());

    Ok(())
}
