//! Host-facing view description.
//!
//! The host owns all rendering and theming; the core only says what the
//! capture control should look like for a given phase.

use crate::models::config::CaptureConfig;

/// Visual description of the capture toggle control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetView {
    /// Prompt to show on the control.
    pub label: String,

    /// Whether the control should span the full width the host offers.
    pub full_width: bool,
}

/// Describe the capture control for the current phase.
///
/// Pure: the same config and phase always yield the same view, so hosts may
/// call this as often as they re-render.
pub fn render_target(config: &CaptureConfig, is_recording: bool) -> TargetView {
    let label = if is_recording {
        config.stop_prompt.clone()
    } else {
        config.start_prompt.clone()
    };
    TargetView {
        label,
        full_width: config.use_container_width,
    }
}
