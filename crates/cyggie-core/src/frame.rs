/// Per-tick snapshot handed to `update` / `fixed_update`.
///
/// The manager does not own time. The host driver builds these from its own
/// clock and passes them in; the manager only forwards the snapshot to every
/// live service.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub frame_index: u64,
    /// Delta time of this tick, seconds (host-clamped).
    pub dt: f32,
    pub fixed_dt: f32,
    /// Interpolation factor between the last two fixed steps, `[0, 1)`.
    pub fixed_alpha: f32,
    /// Number of fixed steps the host ran before this variable-rate tick.
    pub fixed_steps: u32,
}

impl Frame {
    /// Snapshot for one fixed step; `dt == fixed_dt` by construction.
    #[inline]
    pub fn fixed_step(frame_index: u64, fixed_dt: f32) -> Self {
        Self {
            frame_index,
            dt: fixed_dt,
            fixed_dt,
            fixed_alpha: 0.0,
            fixed_steps: 1,
        }
    }
}
