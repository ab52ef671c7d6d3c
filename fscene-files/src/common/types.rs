use glam::{Mat4, Vec3};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AxisAlignedBox {
    pub center: Vec3,
    /// Half size along each axis.
    pub extents: Vec3,
}

impl AxisAlignedBox {
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Corners in the order of DirectXCollision's `BoundingBox::GetCorners`: the +z face
    /// counter-clockwise starting at (-x, -y), then the -z face in the same order.
    pub fn corners(&self) -> [Vec3; 8] {
        const OFFSETS: [Vec3; 8] = [
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];
        OFFSETS.map(|offset| self.center + self.extents * offset)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// One row of the `BoundsTable`: the three primitives of Unreal's `FBoxSphereBounds`, plus the box
/// and sphere derived from them once the row has been read.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoxSphereBounds {
    pub origin: Vec3,
    pub box_extent: Vec3,
    pub sphere_radius: f32,

    pub box_bounds: AxisAlignedBox,
    pub sphere_bounds: BoundingSphere,
}

impl BoxSphereBounds {
    pub fn new(origin: Vec3, box_extent: Vec3, sphere_radius: f32) -> Self {
        let mut bounds = Self {
            origin,
            box_extent,
            sphere_radius,
            ..Default::default()
        };
        bounds.derive_volumes();
        bounds
    }

    pub(crate) fn derive_volumes(&mut self) {
        self.box_bounds = AxisAlignedBox {
            center: self.origin,
            extents: self.box_extent,
        };
        self.sphere_bounds = BoundingSphere {
            center: self.origin,
            radius: self.sphere_radius,
        };
    }
}

/// One row of `PrimitiveTransforms`. The export writes Unreal's `FMatrix` row by row; as Unreal
/// multiplies row vectors, each exported row becomes one glam column (row 3 is the translation).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimitiveTransform {
    pub matrix: Mat4,
}

impl Default for PrimitiveTransform {
    fn default() -> Self {
        // Unread cells stay zero, as in the export's own matrix type.
        Self { matrix: Mat4::ZERO }
    }
}

impl PrimitiveTransform {
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }
}
