//! Terminal rendering and a `MediaPlayer` that announces clips on stdout.

use async_trait::async_trait;
use tracing::{debug, info};
use visualmath_core::{
    Media, MediaPlayer, PlayRequest, PlaybackError, StepSequenceViewer, ViewerState,
};

const PROGRESS_WIDTH: usize = 30;

/// Stands in for a video element: reports each clip as started.
pub struct TerminalPlayer;

#[async_trait]
impl MediaPlayer for TerminalPlayer {
    async fn play(&self, request: PlayRequest) -> Result<(), PlaybackError> {
        info!(generation = request.generation, clip = %request.path, "Playing clip");
        println!("  ▶ playing {} (muted, plays once)", request.path);
        Ok(())
    }

    fn stop(&self, generation: u64) {
        debug!(generation, "Stopping clip");
    }
}

/// `[#########.....] 33%` style bar for a ratio in (0, 1].
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        ratio * 100.0
    )
}

pub fn render_state(state: &ViewerState) -> String {
    let step = state.current();
    let visual = match &step.media {
        Media::Glyph { text } => text.clone(),
        Media::Clip { path } => format!("clip {}", path),
    };
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", state.sequence().topic()));
    out.push_str(&format!(
        "{}  {}\n",
        state.step_label(),
        progress_bar(state.progress_ratio(), PROGRESS_WIDTH)
    ));
    out.push_str(&format!("\n  {}\n\n", visual));
    out.push_str(&format!("{}\n{}\n", step.title, step.description));
    let mut controls = Vec::new();
    if state.can_retreat() {
        controls.push("p previous");
    }
    if state.can_advance() {
        controls.push("n next");
    }
    controls.push("q quit");
    out.push_str(&format!("\n({})", controls.join(", ")));
    out
}

pub fn render<P: MediaPlayer>(viewer: &StepSequenceViewer<P>) -> String {
    render_state(viewer.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use visualmath_core::catalog::generic_sequence;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(1.0, 4), "[####] 100%");
        assert_eq!(progress_bar(0.5, 4), "[##..]  50%");
        assert_eq!(progress_bar(1.0 / 3.0, 3), "[#..]  33%");
    }

    #[test]
    fn test_render_first_generic_step() {
        let state = ViewerState::initialize(generic_sequence("Integration")).unwrap();
        let out = render_state(&state);

        assert!(out.contains("Integration"));
        assert!(out.contains("Step 1 of 3"));
        assert!(out.contains("📘"));
        assert!(out.contains("(n next, q quit)"));
    }

    #[test]
    fn test_render_last_step_offers_only_previous() {
        let mut state = ViewerState::initialize(generic_sequence("Integration")).unwrap();
        state.advance();
        state.advance();
        let out = render_state(&state);

        assert!(out.contains("Step 3 of 3"));
        assert!(out.contains("(p previous, q quit)"));
    }
}
