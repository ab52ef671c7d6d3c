//! Column layouts of the exported tables.
//!
//! Every record kind lists its columns in file order, each with the extractor that converts the
//! token and stores it in the record. [`populate_record`] is the only code that walks a row.

use crate::common::reader::{
    parse_array, parse_array_first, parse_flag, parse_numeric, RowReader, SUB_ARRAY_SEPARATOR,
};
use crate::common::types::{BoxSphereBounds, PrimitiveTransform};
use crate::scene::types::{
    MaterialFlags, MaterialInstanceRecord, MaterialRecord, SkeletalMeshRecord, StaticMeshRecord,
    TextureRecord,
};
use crate::ParserError;

pub type ColumnReader<T> = fn(&mut T, &str) -> Result<(), ParserError>;

pub struct Column<T: 'static> {
    pub name: &'static str,
    pub read: ColumnReader<T>,
}

pub trait TableRecord: Default + Sized + 'static {
    /// Columns after the row id, in file order.
    const COLUMNS: &'static [Column<Self>];

    /// Called once per row after population stopped, complete or not.
    fn finish(&mut self) {}
}

pub fn column_names<T: TableRecord>() -> Vec<&'static str> {
    T::COLUMNS.iter().map(|column| column.name).collect()
}

#[derive(Debug)]
pub enum RowOutcome {
    Complete,
    /// The row ended before the schema did. `populated` columns have been read.
    Truncated { populated: usize },
    /// A present token could not be converted. Earlier columns have been read.
    Malformed { column: &'static str, error: ParserError },
}

/// Reads `row` column by column into a fresh record. Population stops at the first missing or
/// unconvertible column; the record is returned either way, holding whatever was read before.
pub fn populate_record<T: TableRecord>(row: &[String]) -> (T, RowOutcome) {
    let reader = RowReader::new(row);
    let mut record = T::default();
    let mut outcome = RowOutcome::Complete;

    for (position, column) in T::COLUMNS.iter().enumerate() {
        // +1: the row id is never read
        let Some(token) = reader.try_read_field(position + 1) else {
            outcome = RowOutcome::Truncated { populated: position };
            break;
        };

        if let Err(error) = (column.read)(&mut record, token) {
            outcome = RowOutcome::Malformed {
                column: column.name,
                error,
            };
            break;
        }
    }

    record.finish();
    (record, outcome)
}

macro_rules! column {
    ($record:ty, text $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = token.to_owned();
                Ok(())
            },
        }
    };
    ($record:ty, number $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = parse_numeric(token)?;
                Ok(())
            },
        }
    };
    // u8 columns are written as wider integers and truncated, like the exporter's own reader does
    ($record:ty, byte $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = parse_numeric::<u16>(token)? as u8;
                Ok(())
            },
        }
    };
    ($record:ty, flag $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = parse_flag(token)?;
                Ok(())
            },
        }
    };
    ($record:ty, indices $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = parse_array(token, SUB_ARRAY_SEPARATOR)?;
                Ok(())
            },
        }
    };
    ($record:ty, first_index $field:ident) => {
        Column::<$record> {
            name: stringify!($field),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field = parse_array_first(token, SUB_ARRAY_SEPARATOR)?;
                Ok(())
            },
        }
    };
    ($record:ty, material_flag $flag:ident) => {
        Column::<$record> {
            name: stringify!($flag),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.flags.set(MaterialFlags::$flag, parse_flag(token)?);
                Ok(())
            },
        }
    };
    ($record:ty, vector $field:ident . $axis:ident) => {
        Column::<$record> {
            name: concat!(stringify!($field), ".", stringify!($axis)),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.$field.$axis = parse_numeric(token)?;
                Ok(())
            },
        }
    };
    ($record:ty, cell $row:literal $col:literal) => {
        Column::<$record> {
            name: concat!("m_", $row, $col),
            read: |record: &mut $record, token: &str| -> Result<(), ParserError> {
                record.matrix.col_mut($row)[$col] = parse_numeric(token)?;
                Ok(())
            },
        }
    };
}

impl TableRecord for StaticMeshRecord {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, text name),
        column!(Self, text owner_name),
        column!(Self, number num_vertices),
        column!(Self, number num_triangles),
        column!(Self, number num_instances),
        column!(Self, number num_lods),
        column!(Self, number current_lod),
        column!(Self, text asset_path),
        column!(Self, number unique_id),
        column!(Self, indices bounds_indices),
        column!(Self, indices transforms_indices),
        column!(Self, indices used_materials_indices),
        column!(Self, indices used_material_instances_indices),
    ];
}

impl TableRecord for SkeletalMeshRecord {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, text name),
        column!(Self, text owner_name),
        column!(Self, number num_vertices),
        column!(Self, number num_triangles),
        column!(Self, number num_sections),
        column!(Self, number num_lods),
        column!(Self, number current_lod),
        column!(Self, text asset_path),
        column!(Self, number unique_id),
        column!(Self, first_index bounds_index),
        column!(Self, first_index transform_index),
        column!(Self, indices used_materials_indices),
        column!(Self, indices used_material_instances_indices),
    ];
}

impl TableRecord for PrimitiveTransform {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, cell 0 0),
        column!(Self, cell 0 1),
        column!(Self, cell 0 2),
        column!(Self, cell 0 3),
        column!(Self, cell 1 0),
        column!(Self, cell 1 1),
        column!(Self, cell 1 2),
        column!(Self, cell 1 3),
        column!(Self, cell 2 0),
        column!(Self, cell 2 1),
        column!(Self, cell 2 2),
        column!(Self, cell 2 3),
        column!(Self, cell 3 0),
        column!(Self, cell 3 1),
        column!(Self, cell 3 2),
        column!(Self, cell 3 3),
    ];
}

impl TableRecord for BoxSphereBounds {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, vector origin.x),
        column!(Self, vector origin.y),
        column!(Self, vector origin.z),
        column!(Self, vector box_extent.x),
        column!(Self, vector box_extent.y),
        column!(Self, vector box_extent.z),
        column!(Self, number sphere_radius),
    ];

    fn finish(&mut self) {
        self.derive_volumes();
    }
}

impl TableRecord for MaterialRecord {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, text name),
        column!(Self, number num_instances),
        column!(Self, number num_refs),
        column!(Self, number bps_count),
        column!(Self, number bps_surface_lightmap),
        column!(Self, number bps_volumetric_lightmap),
        column!(Self, number bps_vertex),
        column!(Self, text tex_samplers),
        column!(Self, text user_interpolators),
        column!(Self, text tex_lookups),
        column!(Self, text vt_lookups),
        column!(Self, text shader_errors),
        column!(Self, text material_domain),
        column!(Self, text blend_mode),
        column!(Self, text decal_blend_mode),
        column!(Self, text shading_model),
        column!(Self, material_flag TWO_SIDED),
        column!(Self, material_flag CAST_RAY_TRACED_SHADOWS),
        column!(Self, material_flag SCREEN_SPACE_REFLECTIONS),
        column!(Self, material_flag CONTACT_SHADOWS),
        column!(Self, text translucency_lighting_mode),
        column!(Self, number translucency_directional_lighting_intensity),
        column!(Self, material_flag USE_TRANSLUCENCY_VERTEX_FOG),
        column!(Self, material_flag COMPUTE_FOG_PER_PIXEL),
        column!(Self, material_flag OUTPUT_TRANSLUCENT_VELOCITY),
        column!(Self, material_flag ENABLE_SEPARATE_TRANSLUCENCY),
        column!(Self, material_flag ENABLE_RESPONSIVE_AA),
        column!(Self, material_flag ENABLE_MOBILE_SEPARATE_TRANSLUCENCY),
        column!(Self, material_flag DISABLE_DEPTH_TEST),
        column!(Self, material_flag WRITE_ONLY_ALPHA),
        column!(Self, material_flag ALLOW_TRANSLUCENT_CUSTOM_DEPTH_WRITES),
        column!(Self, material_flag USE_FULL_PRECISION),
        column!(Self, material_flag USE_LIGHTMAP_DIRECTIONALITY),
        column!(Self, material_flag USE_HQ_FORWARD_REFLECTIONS),
        column!(Self, material_flag USE_PLANAR_FORWARD_REFLECTIONS),
        column!(Self, text asset_path),
        column!(Self, number unique_id),
        column!(Self, indices used_textures_indices),
        column!(Self, indices material_instance_indices),
    ];
}

impl TableRecord for MaterialInstanceRecord {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, text name),
        column!(Self, number num_refs),
        column!(Self, text parent_name),
        column!(Self, number parent_index),
        column!(Self, text asset_path),
        column!(Self, number unique_id),
        column!(Self, indices used_textures_indices),
    ];
}

impl TableRecord for TextureRecord {
    const COLUMNS: &'static [Column<Self>] = &[
        column!(Self, text name),
        column!(Self, text texture_type),
        column!(Self, number num_refs),
        column!(Self, text current_size),
        column!(Self, text pixel_format),
        column!(Self, number current_kb),
        column!(Self, number fully_loaded_kb),
        column!(Self, number pvrtc2),
        column!(Self, number pvrtc4),
        column!(Self, number astc_4x4),
        column!(Self, number astc_6x6),
        column!(Self, number astc_8x8),
        column!(Self, number astc_10x10),
        column!(Self, number astc_12x12),
        column!(Self, text source_size),
        column!(Self, text source_format),
        column!(Self, flag compression_no_alpha),
        column!(Self, number lod_bias),
        column!(Self, byte num_resident_mips),
        column!(Self, byte num_mips_allowed),
        column!(Self, byte current_mips),
        column!(Self, number current_size_x),
        column!(Self, number current_size_y),
        column!(Self, number source_size_x),
        column!(Self, number source_size_y),
        column!(Self, text asset_path),
        column!(Self, number unique_id),
    ];
}
