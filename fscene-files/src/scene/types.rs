use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::common::types::{BoxSphereBounds, PrimitiveTransform};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticMeshRecord {
    pub name: String,
    pub owner_name: String,
    pub asset_path: String,

    pub unique_id: u32,
    pub num_vertices: u32,
    pub num_triangles: u32,
    pub num_instances: u32,

    /// First is the mesh itself, the rest are its instances.
    pub bounds_indices: Vec<i32>,
    /// First is the mesh itself, the rest are its instances.
    pub transforms_indices: Vec<i32>,
    pub used_materials_indices: Vec<i32>,
    pub used_material_instances_indices: Vec<i32>,

    pub num_lods: u16,
    pub current_lod: u16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletalMeshRecord {
    pub name: String,
    pub owner_name: String,
    pub asset_path: String,

    pub unique_id: u32,
    pub num_vertices: u32,
    pub num_triangles: u32,
    pub num_sections: u32,

    pub bounds_index: i32,
    pub transform_index: i32,
    pub used_materials_indices: Vec<i32>,
    pub used_material_instances_indices: Vec<i32>,

    pub num_lods: u16,
    pub current_lod: u16,
}

/// The exporter writes landscape tables, but they carry nothing of interest yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandscapeRecord {}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        const TWO_SIDED = 1 << 0;
        const CAST_RAY_TRACED_SHADOWS = 1 << 1;
        // Translucency
        const SCREEN_SPACE_REFLECTIONS = 1 << 2;
        const CONTACT_SHADOWS = 1 << 3;
        /// "Apply Fogging" in the material editor.
        const USE_TRANSLUCENCY_VERTEX_FOG = 1 << 4;
        const COMPUTE_FOG_PER_PIXEL = 1 << 5;
        const OUTPUT_TRANSLUCENT_VELOCITY = 1 << 6;
        /// "Render After DOF" in the material editor.
        const ENABLE_SEPARATE_TRANSLUCENCY = 1 << 7;
        const ENABLE_RESPONSIVE_AA = 1 << 8;
        const ENABLE_MOBILE_SEPARATE_TRANSLUCENCY = 1 << 9;
        const DISABLE_DEPTH_TEST = 1 << 10;
        const WRITE_ONLY_ALPHA = 1 << 11;
        const ALLOW_TRANSLUCENT_CUSTOM_DEPTH_WRITES = 1 << 12;
        // Mobile
        const USE_FULL_PRECISION = 1 << 13;
        const USE_LIGHTMAP_DIRECTIONALITY = 1 << 14;
        // Forward shading
        const USE_HQ_FORWARD_REFLECTIONS = 1 << 15;
        const USE_PLANAR_FORWARD_REFLECTIONS = 1 << 16;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialRecord {
    pub name: String,
    pub asset_path: String,

    // Shader statistics, as the editor prints them. See [`crate::scene::stats::ShaderStats`].
    pub tex_samplers: String,
    pub user_interpolators: String,
    pub tex_lookups: String,
    pub vt_lookups: String,
    pub shader_errors: String,

    pub material_domain: String,
    pub blend_mode: String,
    pub decal_blend_mode: String,
    pub shading_model: String,
    pub translucency_lighting_mode: String,
    pub translucency_directional_lighting_intensity: f32,

    pub unique_id: u32,
    pub num_instances: u32,
    pub num_refs: u32,
    pub material_instance_indices: Vec<i32>,
    pub used_textures_indices: Vec<i32>,

    /// Base pass shader instruction counts.
    pub bps_count: i32,
    pub bps_surface_lightmap: i32,
    pub bps_volumetric_lightmap: i32,
    pub bps_vertex: i32,

    pub flags: MaterialFlags,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialInstanceRecord {
    pub name: String,
    pub asset_path: String,
    pub parent_name: String,

    pub unique_id: u32,
    pub num_refs: u32,
    /// Index into the materials of the same LOD, negative when the parent was not exported.
    pub parent_index: i32,
    pub used_textures_indices: Vec<i32>,
}

/// Also used for the `LightMapsAndShadowMaps` table.
#[derive(Debug, Clone, Default)]
pub struct TextureRecord {
    pub name: String,
    pub asset_path: String,
    pub texture_type: String,

    pub current_size: String,
    pub pixel_format: String,
    pub source_size: String,
    pub source_format: String,

    pub unique_id: u32,
    pub num_refs: u32,
    pub lod_bias: i32,

    pub current_kb: f32,
    pub fully_loaded_kb: f32,

    // Estimated footprint per mobile compression format.
    pub pvrtc2: f32,
    pub pvrtc4: f32,
    pub astc_4x4: f32,
    pub astc_6x6: f32,
    pub astc_8x8: f32,
    pub astc_10x10: f32,
    pub astc_12x12: f32,

    pub current_size_x: u16,
    pub current_size_y: u16,
    pub source_size_x: u16,
    pub source_size_y: u16,

    pub num_resident_mips: u8,
    pub num_mips_allowed: u8,
    pub current_mips: u8,
    pub compression_no_alpha: bool,
}

// Materials, instances and textures are the same asset whenever their unique id matches.
macro_rules! identity_by_unique_id {
    ($($record:ty),*) => {
        $(
            impl PartialEq for $record {
                fn eq(&self, other: &Self) -> bool {
                    self.unique_id == other.unique_id
                }
            }

            impl Eq for $record {}

            impl Hash for $record {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.unique_id.hash(state);
                }
            }
        )*
    };
}

identity_by_unique_id!(MaterialRecord, MaterialInstanceRecord, TextureRecord);

/// Everything exported for one LOD. Records reference each other by index into the collections
/// of the same set, so a set can be cloned or dropped as a whole.
#[derive(Debug, Clone, Default)]
pub struct SceneDataSet {
    pub static_meshes: Vec<StaticMeshRecord>,
    pub skeletal_meshes: Vec<SkeletalMeshRecord>,
    pub landscapes: Vec<LandscapeRecord>,

    pub primitive_transforms: Vec<PrimitiveTransform>,

    pub bounds: Vec<BoxSphereBounds>,
    pub materials: Vec<MaterialRecord>,
    pub material_instances: Vec<MaterialInstanceRecord>,
    pub textures: Vec<TextureRecord>,

    /// LOD-invariant, only filled in the LOD 0 set.
    pub light_maps_and_shadow_maps: Vec<TextureRecord>,
}

impl SceneDataSet {
    pub fn is_empty(&self) -> bool {
        self.static_meshes.is_empty()
            && self.skeletal_meshes.is_empty()
            && self.landscapes.is_empty()
            && self.primitive_transforms.is_empty()
            && self.bounds.is_empty()
            && self.materials.is_empty()
            && self.material_instances.is_empty()
            && self.textures.is_empty()
            && self.light_maps_and_shadow_maps.is_empty()
    }
}
