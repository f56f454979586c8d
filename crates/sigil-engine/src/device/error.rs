/// What the frame loop should do after `Gpu::begin_frame` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; retry next frame.
    Reconfigured,
    /// Drop this frame only.
    SkipFrame,
    /// Unrecoverable, typically out of memory. The app should exit.
    Fatal,
}

impl SurfaceErrorAction {
    #[inline]
    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}
