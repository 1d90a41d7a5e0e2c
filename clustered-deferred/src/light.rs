//! Point lights and the packed light-attribute buffer

use cluster_common::{Texel, TextureLayout, extract_scalar};
use glam::Vec3;

/// Texel rows per light: `(position, radius)` then `(color, unused)`
pub const LIGHT_TEXEL_ROWS: usize = 2;

/// Isotropic point light, as supplied by the scene each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Falloff cutoff distance
    pub radius: f32,
    /// Linear RGB color
    pub color: Vec3,
}

impl PointLight {
    pub const fn new(position: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            position,
            radius,
            color,
        }
    }
}

/// Light-attribute buffer
///
/// # Layout
///
/// One column per light, two texel rows:
/// - row 0: `(position.x, position.y, position.z, radius)`
/// - row 1: `(color.r, color.g, color.b, 0)`
#[derive(Debug, Clone)]
pub struct LightBuffer {
    layout: TextureLayout,
    texels: Vec<Texel>,
}

impl Default for LightBuffer {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl LightBuffer {
    /// Empty buffer with room for `capacity` lights before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            layout: TextureLayout::new(0, LIGHT_TEXEL_ROWS),
            texels: Vec::with_capacity(capacity * LIGHT_TEXEL_ROWS),
        }
    }

    pub fn from_lights(lights: &[PointLight]) -> Self {
        let mut buffer = Self::with_capacity(lights.len());
        buffer.pack(lights);
        buffer
    }

    /// Repack the buffer from this frame's lights
    pub fn pack(&mut self, lights: &[PointLight]) {
        self.layout = TextureLayout::new(lights.len(), LIGHT_TEXEL_ROWS);
        self.texels.clear();
        self.texels.resize(self.layout.texel_count(), [0.0; 4]);

        for (index, light) in lights.iter().enumerate() {
            let row0 = self.layout.texel_offset(index, 0);
            let row1 = self.layout.texel_offset(index, 1);
            self.texels[row0] = light.position.extend(light.radius).to_array();
            self.texels[row1] = light.color.extend(0.0).to_array();
        }
    }

    /// Number of packed lights
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.width == 0
    }

    #[inline]
    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    /// Decode light `index` through the guarded sampling path
    ///
    /// An index past [`LightBuffer::len`] decodes to a zeroed light, which
    /// contributes nothing when shaded.
    pub fn unpack(&self, index: usize) -> PointLight {
        if index >= self.len() {
            return PointLight::new(Vec3::ZERO, 0.0, Vec3::ZERO);
        }
        let scalar = |component| extract_scalar(&self.texels, self.layout, index, component);
        PointLight {
            position: Vec3::new(scalar(0), scalar(1), scalar(2)),
            radius: scalar(3),
            color: Vec3::new(scalar(4), scalar(5), scalar(6)),
        }
    }

    #[inline]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lights(count: usize) -> Vec<PointLight> {
        (0..count)
            .map(|i| {
                let f = i as f32;
                PointLight::new(
                    Vec3::new(f - 14.0, f * 0.5, 6.0 - f * 0.25),
                    1.0 + f * 0.125,
                    Vec3::new(f / count as f32, 0.5, 1.0 - f / count as f32),
                )
            })
            .collect()
    }

    #[test]
    fn test_layout() {
        let buffer = LightBuffer::from_lights(&sample_lights(100));
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.layout(), TextureLayout::new(100, 2));
        assert_eq!(buffer.texels().len(), 200);
        assert_eq!(buffer.as_bytes().len(), 200 * 16);
    }

    #[test]
    fn test_rows_hold_position_radius_and_color() {
        let lights = sample_lights(3);
        let buffer = LightBuffer::from_lights(&lights);
        let light = lights[1];
        assert_eq!(
            buffer.texels()[1],
            [light.position.x, light.position.y, light.position.z, light.radius]
        );
        assert_eq!(
            buffer.texels()[3 + 1],
            [light.color.x, light.color.y, light.color.z, 0.0]
        );
    }

    #[test]
    fn test_unpack_every_light() {
        let lights = sample_lights(257);
        let buffer = LightBuffer::from_lights(&lights);
        for (index, light) in lights.iter().enumerate() {
            assert_eq!(buffer.unpack(index), *light, "light {index}");
        }
    }

    #[test]
    fn test_unpack_empty_buffer() {
        let buffer = LightBuffer::default();
        assert_eq!(buffer.unpack(0), PointLight::new(Vec3::ZERO, 0.0, Vec3::ZERO));
    }

    #[test]
    fn test_unpack_out_of_range() {
        let buffer = LightBuffer::from_lights(&sample_lights(3));
        assert_eq!(buffer.unpack(3), PointLight::new(Vec3::ZERO, 0.0, Vec3::ZERO));
        assert_eq!(buffer.unpack(usize::MAX), PointLight::new(Vec3::ZERO, 0.0, Vec3::ZERO));
    }

    #[test]
    fn test_repack_changes_width() {
        let mut buffer = LightBuffer::from_lights(&sample_lights(10));
        buffer.pack(&sample_lights(4));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.texels().len(), 8);
        buffer.pack(&[]);
        assert!(buffer.is_empty());
    }
}
