//! Finding the tables of a scene export and telling their kind and LOD apart, purely from the
//! file names.
//!
//! An export directory is named `World_<Scene>` and contains `<Scene>_<TableKind>_LOD<N>.csv`
//! files, one per table kind and LOD, plus the LOD-less `<Scene>_LightMapsAndShadowMaps.csv`.

use std::fmt::{Display, Formatter};
use std::path::Path;

use itertools::Itertools;
use log::{trace, warn};

use crate::source::TABLE_EXTENSION;

const WORLD_MARKER: &str = "World_";
const LOD_MARKER: &str = "_LOD";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableKind {
    StaticMeshes,
    SkeletalMeshes,
    Landscapes,
    PrimitiveTransforms,
    Bounds,
    Materials,
    MaterialInstances,
    Textures,
    LightMapsAndShadowMaps,
}

impl TableKind {
    pub const ALL: [TableKind; 9] = [
        TableKind::StaticMeshes,
        TableKind::SkeletalMeshes,
        TableKind::Landscapes,
        TableKind::PrimitiveTransforms,
        TableKind::Bounds,
        TableKind::Materials,
        TableKind::MaterialInstances,
        TableKind::Textures,
        TableKind::LightMapsAndShadowMaps,
    ];

    /// The table name as it appears in the file names.
    pub fn stem(&self) -> &'static str {
        match self {
            TableKind::StaticMeshes => "StaticMeshesTable",
            TableKind::SkeletalMeshes => "SkeletalMeshesTable",
            TableKind::Landscapes => "LandscapesTable",
            TableKind::PrimitiveTransforms => "PrimitiveTransforms",
            TableKind::Bounds => "BoundsTable",
            TableKind::Materials => "MaterialsTable",
            TableKind::MaterialInstances => "MaterialInstancesTable",
            TableKind::Textures => "TexturesTable",
            TableKind::LightMapsAndShadowMaps => "LightMapsAndShadowMaps",
        }
    }

    /// The kind a table key belongs to, judged by its stem.
    pub fn of_key(key: &TableKey) -> Option<TableKind> {
        TableKind::ALL.into_iter().find(|kind| {
            key.as_str()
                .strip_prefix(kind.stem())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(LOD_MARKER))
        })
    }

    pub fn is_lod_invariant(&self) -> bool {
        matches!(self, TableKind::LightMapsAndShadowMaps)
    }

    /// The key the table of this kind is stored under for `lod`. LOD-invariant tables ignore `lod`.
    pub fn key(&self, lod: usize) -> TableKey {
        if self.is_lod_invariant() {
            TableKey(self.stem().to_owned())
        } else {
            TableKey(format!("{}{}{}", self.stem(), LOD_MARKER, lod))
        }
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

/// File name without scene prefix and extension, e.g. `StaticMeshesTable_LOD0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey(pub String);

impl TableKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TableKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTable {
    pub file_name: String,
    pub key: TableKey,
    /// `None` for files that merely look like tables.
    pub kind: Option<TableKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDirectory {
    pub tables: Vec<DiscoveredTable>,
    /// Number of LOD slots to allocate: highest LOD found in any file name, plus one.
    pub lod_count: usize,
}

/// The prefix shared by every table file of the export in `dir`: the directory's leaf name without
/// the `World_` marker, followed by `_`.
pub fn scene_prefix(dir: &Path) -> String {
    let leaf = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_", leaf.replacen(WORLD_MARKER, "", 1))
}

/// The LOD encoded in a file name: the single digit right after the last `_LOD`, if any.
pub fn lod_of(file_name: &str) -> Option<usize> {
    let start = file_name.rfind(LOD_MARKER)? + LOD_MARKER.len();
    let digit = file_name[start..].chars().next()?.to_digit(10)?;
    Some(digit as usize)
}

pub fn table_key(file_name: &str, prefix: &str) -> TableKey {
    let without_prefix = file_name.replacen(prefix, "", 1);
    let stem = if without_prefix.to_ascii_lowercase().ends_with(TABLE_EXTENSION) {
        &without_prefix[..without_prefix.len() - TABLE_EXTENSION.len()]
    } else {
        without_prefix.as_str()
    };
    TableKey(stem.to_owned())
}

/// Groups the file names found in `dir` by table key and determines the number of LOD slots.
/// There is always at least one slot, even for an empty directory.
pub fn discover_tables(dir: &Path, file_names: &[String]) -> TableDirectory {
    let prefix = scene_prefix(dir);
    let lod_count = file_names
        .iter()
        .filter_map(|name| lod_of(name))
        .max()
        .unwrap_or(0)
        + 1;

    let tables = file_names
        .iter()
        .map(|file_name| {
            let key = table_key(file_name, &prefix);
            let kind = TableKind::of_key(&key);
            match kind {
                Some(kind) => trace!("{} -> {} ({:?})", file_name, key, kind),
                None => warn!("{} is not a known table, it will be ignored", file_name),
            }
            DiscoveredTable {
                file_name: file_name.clone(),
                key,
                kind,
            }
        })
        .collect_vec();

    TableDirectory { tables, lod_count }
}
