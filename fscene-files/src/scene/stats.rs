//! Numbers mined from the material statistics the editor prints as text, and the per-mesh
//! attributes a visualisation can colour meshes by.
//!
//! The statistics columns hold strings like
//! `2/4 Scalars (1/4 Vectors) (TexCoords: 2, Custom: 0)`. Their wording belongs to the editor, so
//! extraction is best effort: a value that cannot be found counts as zero.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::common::reader::{extract_between, parse_numeric};
use crate::scene::types::{MaterialFlags, MaterialRecord, SceneDataSet, StaticMeshRecord};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ShaderStats {
    pub texture_samplers: u32,
    pub user_interpolator_scalars: u32,
    pub user_interpolator_vectors: u32,
    pub user_interpolator_tex_coords: u32,
    pub user_interpolator_custom: u32,
    pub texture_lookups_vs: u32,
    pub texture_lookups_ps: u32,
    pub virtual_texture_lookups: u32,
}

fn lenient<T: FromStr + Default>(text: &str, left: &str, right: &str) -> T {
    extract_between(text, left, right).unwrap_or_default()
}

impl ShaderStats {
    pub fn from_material(material: &MaterialRecord) -> Self {
        let interpolators = material.user_interpolators.as_str();
        let lookups = material.tex_lookups.as_str();

        Self {
            // "<used>/<max>"
            texture_samplers: lenient(&material.tex_samplers, "", "/"),
            user_interpolator_scalars: lenient(interpolators, "", "/"),
            user_interpolator_vectors: lenient(interpolators, "(", "/"),
            user_interpolator_tex_coords: lenient(interpolators, "TexCoords: ", ","),
            user_interpolator_custom: lenient(interpolators, "Custom: ", ")"),
            texture_lookups_vs: lenient(lookups, "VS(", ")"),
            texture_lookups_ps: lenient(lookups, "PS(", ")"),
            virtual_texture_lookups: parse_numeric(&material.vt_lookups).unwrap_or_default(),
        }
    }
}

impl MaterialRecord {
    pub fn shader_stats(&self) -> ShaderStats {
        ShaderStats::from_material(self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VisualizationAttribute {
    // Mesh
    NumVertices,
    NumTriangles,
    NumInstances,
    NumLods,
    /// Materials and material instances together.
    NumMaterials,
    NumTextures,

    // Material statistics
    BasePassShaderInstructions,
    BasePassShaderWithSurfaceLightmap,
    BasePassShaderWithVolumetricLightmap,
    BasePassVertexShader,
    TextureSamplers,
    UserInterpolatorsScalars,
    UserInterpolatorsVectors,
    UserInterpolatorsTexCoords,
    UserInterpolatorsCustom,
    TextureLookupsVs,
    TextureLookupsPs,
    VirtualTextureLookups,
    TranslucencyDirectionalLightingIntensity,

    /// Any of the mesh's materials has the flag set.
    MaterialFlag(MaterialFlags),

    // Texture
    CurrentKb,
}

impl SceneDataSet {
    /// Materials used by `mesh`, directly or as the parent of one of its material instances.
    /// Out-of-range indices are skipped.
    pub fn materials_of<'a>(
        &'a self,
        mesh: &'a StaticMeshRecord,
    ) -> impl Iterator<Item = &'a MaterialRecord> + 'a {
        let direct = mesh.used_materials_indices.iter().copied();
        let parents = mesh
            .used_material_instances_indices
            .iter()
            .filter_map(|&index| self.material_instances.get(usize::try_from(index).ok()?))
            .map(|instance| instance.parent_index);

        direct
            .chain(parents)
            .filter_map(|index| self.materials.get(usize::try_from(index).ok()?))
    }

    /// Distinct texture indices used by the materials and material instances of `mesh`.
    pub fn texture_indices_of(&self, mesh: &StaticMeshRecord) -> BTreeSet<usize> {
        let from_materials = self
            .materials_of(mesh)
            .flat_map(|material| material.used_textures_indices.iter().copied());
        let from_instances = mesh
            .used_material_instances_indices
            .iter()
            .filter_map(|&index| self.material_instances.get(usize::try_from(index).ok()?))
            .flat_map(|instance| instance.used_textures_indices.iter().copied());

        from_materials
            .chain(from_instances)
            .filter_map(|index| usize::try_from(index).ok())
            .filter(|&index| index < self.textures.len())
            .collect()
    }

    /// The value a visualisation would colour `mesh` by. Material values are the maximum over the
    /// mesh's materials, texture memory is summed over its distinct textures.
    pub fn static_mesh_attribute(
        &self,
        mesh: &StaticMeshRecord,
        attribute: VisualizationAttribute,
    ) -> f32 {
        let max_over_materials = |value: &dyn Fn(&MaterialRecord) -> f32| {
            self.materials_of(mesh).map(value).fold(0.0f32, f32::max)
        };

        match attribute {
            VisualizationAttribute::NumVertices => mesh.num_vertices as f32,
            VisualizationAttribute::NumTriangles => mesh.num_triangles as f32,
            VisualizationAttribute::NumInstances => mesh.num_instances as f32,
            VisualizationAttribute::NumLods => mesh.num_lods as f32,
            VisualizationAttribute::NumMaterials => {
                let direct = mesh.used_materials_indices.len();
                (direct + mesh.used_material_instances_indices.len()) as f32
            }
            VisualizationAttribute::NumTextures => self.texture_indices_of(mesh).len() as f32,
            VisualizationAttribute::BasePassShaderInstructions => {
                max_over_materials(&|m| m.bps_count as f32)
            }
            VisualizationAttribute::BasePassShaderWithSurfaceLightmap => {
                max_over_materials(&|m| m.bps_surface_lightmap as f32)
            }
            VisualizationAttribute::BasePassShaderWithVolumetricLightmap => {
                max_over_materials(&|m| m.bps_volumetric_lightmap as f32)
            }
            VisualizationAttribute::BasePassVertexShader => {
                max_over_materials(&|m| m.bps_vertex as f32)
            }
            VisualizationAttribute::TextureSamplers => {
                max_over_materials(&|m| m.shader_stats().texture_samplers as f32)
            }
            VisualizationAttribute::UserInterpolatorsScalars => {
                max_over_materials(&|m| m.shader_stats().user_interpolator_scalars as f32)
            }
            VisualizationAttribute::UserInterpolatorsVectors => {
                max_over_materials(&|m| m.shader_stats().user_interpolator_vectors as f32)
            }
            VisualizationAttribute::UserInterpolatorsTexCoords => {
                max_over_materials(&|m| m.shader_stats().user_interpolator_tex_coords as f32)
            }
            VisualizationAttribute::UserInterpolatorsCustom => {
                max_over_materials(&|m| m.shader_stats().user_interpolator_custom as f32)
            }
            VisualizationAttribute::TextureLookupsVs => {
                max_over_materials(&|m| m.shader_stats().texture_lookups_vs as f32)
            }
            VisualizationAttribute::TextureLookupsPs => {
                max_over_materials(&|m| m.shader_stats().texture_lookups_ps as f32)
            }
            VisualizationAttribute::VirtualTextureLookups => {
                max_over_materials(&|m| m.shader_stats().virtual_texture_lookups as f32)
            }
            VisualizationAttribute::TranslucencyDirectionalLightingIntensity => {
                max_over_materials(&|m| m.translucency_directional_lighting_intensity)
            }
            VisualizationAttribute::MaterialFlag(flag) => {
                max_over_materials(&|m| if m.flags.contains(flag) { 1.0 } else { 0.0 })
            }
            VisualizationAttribute::CurrentKb => self
                .texture_indices_of(mesh)
                .into_iter()
                .map(|index| self.textures[index].current_kb)
                .sum(),
        }
    }
}
