use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::{debug, warn};

use crate::discovery::{TableKey, TableKind};
use crate::scene::schema::{populate_record, RowOutcome, TableRecord};
use crate::scene::types::SceneDataSet;

/// Tokenized data rows (header removed) per table key.
pub type TableRows = HashMap<TableKey, Vec<Vec<String>>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableDiagnostics {
    pub complete: usize,
    /// Rows that ran out of columns before the schema did.
    pub truncated: usize,
    /// Rows with a token that could not be converted.
    pub malformed: usize,
}

impl TableDiagnostics {
    pub fn rows(&self) -> usize {
        self.complete + self.truncated + self.malformed
    }
}

/// A non-negative index that points past the end of its target collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub table: TableKind,
    /// Position of the referencing record in its collection.
    pub record: usize,
    pub field: &'static str,
    pub index: i32,
    pub target: TableKind,
    pub target_len: usize,
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}].{} = {} but {} has {} entries",
            self.table, self.record, self.field, self.index, self.target, self.target_len
        )
    }
}

/// Everything that went wrong during an import without stopping it.
#[derive(Debug, Clone, Default)]
pub struct ImportDiagnostics {
    /// Set when the export directory itself could not be listed.
    pub directory_error: Option<String>,
    pub unreadable_files: Vec<String>,
    pub tables: BTreeMap<TableKey, TableDiagnostics>,
    pub dangling_references: BTreeMap<usize, Vec<DanglingReference>>,
}

impl ImportDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.directory_error.is_none()
            && self.unreadable_files.is_empty()
            && self.dangling_references.is_empty()
            && self
                .tables
                .values()
                .all(|table| table.truncated == 0 && table.malformed == 0)
    }
}

/// Turns tokenized tables into one [`SceneDataSet`] per LOD.
pub struct SceneSetBuilder<'a> {
    tables: &'a TableRows,
    diagnostics: &'a mut ImportDiagnostics,
}

impl<'a> SceneSetBuilder<'a> {
    pub fn new(tables: &'a TableRows, diagnostics: &'a mut ImportDiagnostics) -> Self {
        Self { tables, diagnostics }
    }

    /// Builds `lod_count` sets. A LOD without files gets an empty set, never a missing one.
    pub fn build(mut self, lod_count: usize) -> Vec<SceneDataSet> {
        (0..lod_count).map(|lod| self.build_lod(lod)).collect_vec()
    }

    fn build_lod(&mut self, lod: usize) -> SceneDataSet {
        let mut set = SceneDataSet {
            static_meshes: self.populate(TableKind::StaticMeshes.key(lod)),
            skeletal_meshes: self.populate(TableKind::SkeletalMeshes.key(lod)),
            primitive_transforms: self.populate(TableKind::PrimitiveTransforms.key(lod)),
            bounds: self.populate(TableKind::Bounds.key(lod)),
            materials: self.populate(TableKind::Materials.key(lod)),
            material_instances: self.populate(TableKind::MaterialInstances.key(lod)),
            textures: self.populate(TableKind::Textures.key(lod)),
            ..Default::default()
        };

        // Shared by all LODs, kept once in the first set.
        if lod == 0 {
            let key = TableKind::LightMapsAndShadowMaps.key(lod);
            set.light_maps_and_shadow_maps = self.populate(key);
        }

        if let Some(rows) = self.tables.get(&TableKind::Landscapes.key(lod)) {
            debug!("Ignoring {} landscape rows for LOD {}", rows.len(), lod);
        }

        let dangling = set.dangling_references();
        if !dangling.is_empty() {
            warn!("LOD {} has {} dangling references", lod, dangling.len());
            for reference in &dangling {
                debug!("{}", reference);
            }
            self.diagnostics.dangling_references.insert(lod, dangling);
        }

        set
    }

    fn populate<T: TableRecord>(&mut self, key: TableKey) -> Vec<T> {
        let Some(rows) = self.tables.get(&key) else {
            return Vec::new();
        };

        let mut counts = TableDiagnostics::default();
        let records = rows
            .iter()
            .enumerate()
            .map(|(row_number, row)| {
                let (record, outcome) = populate_record::<T>(row);
                match outcome {
                    RowOutcome::Complete => counts.complete += 1,
                    RowOutcome::Truncated { .. } => counts.truncated += 1,
                    RowOutcome::Malformed { column, error } => {
                        debug!(
                            "{} row {}: column {} unreadable: {}",
                            key, row_number, column, error
                        );
                        counts.malformed += 1;
                    }
                }
                record
            })
            .collect_vec();

        if counts.truncated > 0 || counts.malformed > 0 {
            warn!(
                "{}: {} of {} rows incomplete ({} truncated, {} malformed)",
                key,
                counts.truncated + counts.malformed,
                counts.rows(),
                counts.truncated,
                counts.malformed
            );
        }
        debug!("{}: {} records", key, records.len());

        self.diagnostics.tables.insert(key, counts);
        records
    }
}

impl SceneDataSet {
    /// Every non-negative index in this set that points outside its target collection. Light and
    /// shadow maps are not referenced by index from any other table.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut found = Vec::new();
        let mut check = |table, record, field, indices: &[i32], target, target_len: usize| {
            for &index in indices {
                let in_range = usize::try_from(index).map_or(true, |index| index < target_len);
                if !in_range {
                    found.push(DanglingReference {
                        table,
                        record,
                        field,
                        index,
                        target,
                        target_len,
                    });
                }
            }
        };

        let bounds = self.bounds.len();
        let transforms = self.primitive_transforms.len();
        let materials = self.materials.len();
        let instances = self.material_instances.len();
        let textures = self.textures.len();

        for (position, mesh) in self.static_meshes.iter().enumerate() {
            let table = TableKind::StaticMeshes;
            check(
                table,
                position,
                "bounds_indices",
                &mesh.bounds_indices,
                TableKind::Bounds,
                bounds,
            );
            check(
                table,
                position,
                "transforms_indices",
                &mesh.transforms_indices,
                TableKind::PrimitiveTransforms,
                transforms,
            );
            check(
                table,
                position,
                "used_materials_indices",
                &mesh.used_materials_indices,
                TableKind::Materials,
                materials,
            );
            check(
                table,
                position,
                "used_material_instances_indices",
                &mesh.used_material_instances_indices,
                TableKind::MaterialInstances,
                instances,
            );
        }

        for (position, mesh) in self.skeletal_meshes.iter().enumerate() {
            let table = TableKind::SkeletalMeshes;
            check(table, position, "bounds_index", &[mesh.bounds_index], TableKind::Bounds, bounds);
            check(
                table,
                position,
                "transform_index",
                &[mesh.transform_index],
                TableKind::PrimitiveTransforms,
                transforms,
            );
            check(
                table,
                position,
                "used_materials_indices",
                &mesh.used_materials_indices,
                TableKind::Materials,
                materials,
            );
            check(
                table,
                position,
                "used_material_instances_indices",
                &mesh.used_material_instances_indices,
                TableKind::MaterialInstances,
                instances,
            );
        }

        for (position, material) in self.materials.iter().enumerate() {
            let table = TableKind::Materials;
            check(
                table,
                position,
                "used_textures_indices",
                &material.used_textures_indices,
                TableKind::Textures,
                textures,
            );
            check(
                table,
                position,
                "material_instance_indices",
                &material.material_instance_indices,
                TableKind::MaterialInstances,
                instances,
            );
        }

        for (position, instance) in self.material_instances.iter().enumerate() {
            let table = TableKind::MaterialInstances;
            check(
                table,
                position,
                "parent_index",
                &[instance.parent_index],
                TableKind::Materials,
                materials,
            );
            check(
                table,
                position,
                "used_textures_indices",
                &instance.used_textures_indices,
                TableKind::Textures,
                textures,
            );
        }

        found
    }
}
