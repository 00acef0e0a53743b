pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, SurfaceCapabilities, TextureFormat};

    fn caps(formats: Vec<TextureFormat>, alpha_modes: Vec<CompositeAlphaMode>) -> SurfaceCapabilities {
        SurfaceCapabilities { formats, alpha_modes, ..Default::default() }
    }

    #[test]
    fn srgb_format_is_preferred() {
        let c = caps(vec![TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb], vec![]);
        assert_eq!(choose_surface_format(&c, true), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn no_formats_means_no_surface() {
        assert_eq!(choose_surface_format(&caps(vec![], vec![]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(vec![], vec![CompositeAlphaMode::Opaque]);
        assert_eq!(choose_alpha_mode(&c, Some(CompositeAlphaMode::PreMultiplied)), CompositeAlphaMode::Opaque);
        assert_eq!(choose_alpha_mode(&caps(vec![], vec![]), None), CompositeAlphaMode::Auto);
    }
}
