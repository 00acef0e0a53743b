/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are multiplied by `a` (premultiplied alpha).
///
/// Renderers target an sRGB surface when one is available, so values here are
/// linear; use [`Color::from_srgb`] for colors picked in sRGB space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// Creates a premultiplied linear color from straight-alpha linear components.
    #[inline]
    pub fn from_linear(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Creates a color from straight-alpha sRGB components in `[0, 1]`.
    ///
    /// The sRGB transfer curve is decoded so the color appears as picked once
    /// written to an sRGB surface.
    #[inline]
    pub fn from_srgb(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::from_linear(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a)
    }

    /// Opaque neutral grey from an sRGB white level (`0.0` black, `1.0` white).
    #[inline]
    pub fn grey(white: f32) -> Self {
        Self::from_srgb(white, white, white, 1.0)
    }

    /// Composites black at `amount` opacity over this color.
    ///
    /// `amount` is clamped to `[0, 1]`; `0` returns the color unchanged.
    #[inline]
    #[must_use]
    pub fn darkened(self, amount: f32) -> Self {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a + (1.0 - self.a) * (1.0 - k),
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn grey_endpoints_are_exact() {
        assert_eq!(Color::grey(0.0), Color::from_linear(0.0, 0.0, 0.0, 1.0));
        assert_eq!(Color::grey(1.0), Color::white());
    }

    #[test]
    fn grey_decodes_srgb_curve() {
        // sRGB 0.5 is roughly 0.214 in linear light.
        let c = Color::grey(0.5);
        assert!(close(c.r, 0.214_041), "got {}", c.r);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn from_linear_premultiplies() {
        let c = Color::from_linear(1.0, 0.5, 0.0, 0.5);
        assert!(close(c.r, 0.5) && close(c.g, 0.25) && close(c.b, 0.0));
    }

    #[test]
    fn darkened_scales_rgb_and_keeps_opaque_alpha() {
        let c = Color::white().darkened(0.25);
        assert!(close(c.r, 0.75) && close(c.g, 0.75) && close(c.b, 0.75));
        assert!(close(c.a, 1.0));
    }

    #[test]
    fn darkened_zero_is_identity_and_clamps() {
        let c = Color::grey(0.3);
        assert_eq!(c.darkened(0.0), c);
        let black = c.darkened(4.0);
        assert!(close(black.r, 0.0) && close(black.a, 1.0));
    }

    #[test]
    fn darkening_translucent_color_raises_alpha() {
        let c = Color::from_linear(0.0, 0.0, 0.0, 0.0).darkened(0.5);
        assert!(close(c.a, 0.5));
        assert!(close(c.r, 0.0));
    }
}
