/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl SurfaceErrorAction {
    /// Classifies a surface error. `Reconfigured` means the caller must
    /// configure the surface again before the next frame.
    pub(crate) fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_out_of_memory_is_fatal() {
        use wgpu::SurfaceError as E;
        assert_eq!(SurfaceErrorAction::classify(&E::OutOfMemory), SurfaceErrorAction::Fatal);
        assert_eq!(SurfaceErrorAction::classify(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::classify(&E::Other), SurfaceErrorAction::SkipFrame);
    }
}
