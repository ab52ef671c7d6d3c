use std::sync::Arc;
use std::time::Duration;

use fscene_files::scene::stats::VisualizationAttribute;
use fscene_files::scene::types::SceneDataSet;
use glam::Vec3;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::importer::{ImportedScene, SceneImporter};
use crate::settings::Scale;

/// Unreal is right-handed with z up, the viewer works left-handed.
const HANDEDNESS: Vec3 = Vec3::new(1.0, 1.0, -1.0);

/// One wireframe box of the bounds view, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsBox {
    pub corners: [Vec3; 8],
    /// What the box would be coloured by.
    pub value: f32,
}

/// Stands in for the render/update loop: polls the importer and rebuilds its view whenever a new
/// import was published.
pub struct SceneViewer {
    importer: Arc<SceneImporter>,
    scale: Scale,
    lod: usize,
    attribute: VisualizationAttribute,
    scene: Option<Arc<ImportedScene>>,
    boxes: Vec<BoundsBox>,
}

impl SceneViewer {
    pub fn new(importer: Arc<SceneImporter>, scale: Scale, lod: usize) -> Self {
        Self {
            importer,
            scale,
            lod,
            attribute: VisualizationAttribute::NumVertices,
            scene: None,
            boxes: Vec::new(),
        }
    }

    /// One tick. Returns whether a new import was picked up.
    pub fn update(&mut self) -> bool {
        profiling::scope!("SceneViewer::update");
        if !self.importer.take_dirty() {
            return false;
        }

        self.scene = self.importer.imported();
        self.boxes = match &self.scene {
            Some(scene) => self.build_boxes(scene),
            None => Vec::new(),
        };

        self.log_summary();
        true
    }

    fn build_boxes(&self, scene: &ImportedScene) -> Vec<BoundsBox> {
        let Some(set) = scene.scene(self.lod) else {
            warn!(
                "LOD {} requested, but the import only has {} LODs",
                self.lod,
                scene.lod_count()
            );
            return Vec::new();
        };

        bounds_boxes(set, self.scale, self.attribute)
    }

    fn log_summary(&self) {
        let Some(scene) = &self.scene else {
            info!("Scene cleared");
            return;
        };

        info!(
            "{}: {} LODs, imported in {:.2?}, {} light/shadow maps",
            scene.directory.display(),
            scene.lod_count(),
            scene.elapsed,
            scene.light_maps().len()
        );
        for (lod, set) in scene.lod_sets.iter().enumerate() {
            info!(
                "  LOD{}: {} static meshes, {} skeletal meshes, {} bounds, {} transforms",
                lod,
                set.static_meshes.len(),
                set.skeletal_meshes.len(),
                set.bounds.len(),
                set.primitive_transforms.len()
            );
            info!(
                "  LOD{}: {} materials, {} instances, {} textures",
                lod,
                set.materials.len(),
                set.material_instances.len(),
                set.textures.len()
            );
        }
        info!("Showing {} bounds boxes of LOD {}", self.boxes.len(), self.lod);
    }

    /// Ticks until an import was consumed and no other one is running.
    pub fn run(&mut self, poll_interval: Duration) {
        let mut consumed_any = false;
        loop {
            // busy drops only after dirty was raised, so sample it first
            let was_busy = self.importer.is_busy();
            consumed_any |= self.update();

            match run_step(was_busy, consumed_any, self.importer.is_busy()) {
                RunStep::Wait => std::thread::sleep(poll_interval),
                RunStep::Finished => return,
                RunStep::Stalled => {
                    warn!("The importer stopped without publishing anything");
                    return;
                }
            }
        }
    }

    pub fn scene(&self) -> Option<&Arc<ImportedScene>> {
        self.scene.as_ref()
    }

    pub fn boxes(&self) -> &[BoundsBox] {
        &self.boxes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStep {
    Wait,
    Finished,
    Stalled,
}

/// Decides the next step of `run` from the busy flag sampled before the tick, whether any tick so
/// far consumed an import, and the busy flag after the tick.
fn run_step(was_busy: bool, consumed_any: bool, is_busy: bool) -> RunStep {
    if consumed_any && !is_busy {
        RunStep::Finished
    } else if consumed_any || was_busy {
        RunStep::Wait
    } else {
        RunStep::Stalled
    }
}

/// One box per bounds index of every static mesh (the mesh itself and each instance), scaled and
/// converted to the viewer's handedness. Indices outside the bounds table are skipped.
pub fn bounds_boxes(
    set: &SceneDataSet,
    scale: Scale,
    attribute: VisualizationAttribute,
) -> Vec<BoundsBox> {
    set.static_meshes
        .iter()
        .flat_map(move |mesh| {
            let value = set.static_mesh_attribute(mesh, attribute);
            mesh.bounds_indices
                .iter()
                .filter_map(move |&index| set.bounds.get(usize::try_from(index).ok()?))
                .map(move |bounds| BoundsBox {
                    corners: bounds
                        .box_bounds
                        .corners()
                        .map(|corner| corner * scale.0 * HANDEDNESS),
                    value,
                })
        })
        .inspect(|bounds_box| debug!("{:?}", bounds_box))
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fscene_files::common::types::BoxSphereBounds;
    use fscene_files::scene::stats::VisualizationAttribute;
    use fscene_files::scene::types::{SceneDataSet, StaticMeshRecord};
    use glam::Vec3;

    use crate::importer::SceneImporter;
    use crate::settings::Scale;
    use crate::viewer::{RunStep, SceneViewer, bounds_boxes, run_step};

    #[test]
    fn boxes_are_scaled_and_mirrored() {
        let set = SceneDataSet {
            static_meshes: vec![StaticMeshRecord {
                num_vertices: 24,
                bounds_indices: vec![0, 7],
                ..Default::default()
            }],
            bounds: vec![BoxSphereBounds::new(
                Vec3::new(100.0, 0.0, 50.0),
                Vec3::splat(10.0),
                17.3,
            )],
            ..Default::default()
        };

        let boxes = bounds_boxes(&set, Scale(0.01), VisualizationAttribute::NumVertices);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].value, 24.0);
        // first corner is (-x, -y, +z) before mirroring
        assert!(boxes[0].corners[0].abs_diff_eq(Vec3::new(0.9, -0.1, -0.6), 1e-6));
    }

    #[test_log::test]
    fn update_consumes_dirty_once() -> Result<(), anyhow::Error> {
        let dir = std::env::current_dir()?
            .join("fscene-files")
            .join("test-data")
            .join("World_Foo");
        let importer = Arc::new(SceneImporter::new());
        let mut viewer = SceneViewer::new(importer.clone(), Scale(1.0), 0);
        assert!(!viewer.update());

        let handle = importer
            .request_import(dir)
            .ok_or_else(|| anyhow::anyhow!("request rejected"))?;
        handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;

        assert!(viewer.update());
        assert!(!importer.is_dirty());
        assert!(!viewer.update());
        // SM_Cube has two bounds, the short and the malformed row none
        assert_eq!(viewer.boxes().len(), 2);
        assert_eq!(viewer.scene().map(|scene| scene.lod_count()), Some(3));

        importer.clear();
        assert!(viewer.update());
        assert!(viewer.scene().is_none());
        assert!(viewer.boxes().is_empty());

        Ok(())
    }

    #[test]
    fn run_finishes_once_something_was_consumed() {
        // consumed on an earlier tick while busy, busy has dropped since
        assert_eq!(run_step(false, true, false), RunStep::Finished);
        assert_eq!(run_step(true, true, false), RunStep::Finished);
        assert_eq!(run_step(true, true, true), RunStep::Wait);
        assert_eq!(run_step(true, false, false), RunStep::Wait);
        assert_eq!(run_step(false, false, false), RunStep::Stalled);
    }

    #[test_log::test]
    fn run_consumes_import_of_missing_directory() -> Result<(), anyhow::Error> {
        let dir = std::env::current_dir()?
            .join("fscene-files")
            .join("test-data")
            .join("World_Missing");
        let importer = Arc::new(SceneImporter::new());
        let mut viewer = SceneViewer::new(importer.clone(), Scale(1.0), 0);

        let handle = importer
            .request_import(dir)
            .ok_or_else(|| anyhow::anyhow!("request rejected"))?;
        viewer.run(Duration::from_millis(1));
        handle.join().map_err(|_| anyhow::anyhow!("importer panicked"))?;

        let scene = viewer.scene().ok_or_else(|| anyhow::anyhow!("nothing consumed"))?;
        assert_eq!(scene.lod_count(), 1);
        assert!(scene.diagnostics.directory_error.is_some());
        assert!(viewer.boxes().is_empty());
        assert!(!importer.is_dirty());

        Ok(())
    }
}
