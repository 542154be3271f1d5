//! Collaborator interfaces
//!
//! The simulation never touches the DOM or the GPU. Hosts implement these
//! traits; the session calls them from the same logical thread as the tick.

use crate::sim::{ParticleDirector, Stage};

/// Stage panels, loading screen and error banner
pub trait UiPanels {
    fn show_panel(&mut self, stage: Stage);
    fn hide_panel(&mut self, stage: Stage);
    fn hide_loading(&mut self);
    fn show_error(&mut self, message: &str);
}

/// Draws the particle scene once per display refresh.
///
/// Implementations read each pool's buffers and clear its redraw flag with
/// [`crate::sim::ParticlePool::take_redraw`] once uploaded.
pub trait SceneRenderer {
    fn render(&mut self, scene: &mut ParticleDirector);
}

/// UI that only records what it was asked to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingUi {
    pub visible: Vec<Stage>,
    pub loading_visible: bool,
    pub error: Option<String>,
    pub log: Vec<UiCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    Show(Stage),
    Hide(Stage),
    HideLoading,
    Error(String),
}

impl RecordingUi {
    /// Stage one visible behind the loading screen
    pub fn new() -> Self {
        Self {
            visible: vec![Stage::One],
            loading_visible: true,
            error: None,
            log: Vec::new(),
        }
    }

    pub fn is_visible(&self, stage: Stage) -> bool {
        self.visible.contains(&stage)
    }
}

impl UiPanels for RecordingUi {
    fn show_panel(&mut self, stage: Stage) {
        if !self.visible.contains(&stage) {
            self.visible.push(stage);
        }
        self.log.push(UiCall::Show(stage));
    }

    fn hide_panel(&mut self, stage: Stage) {
        self.visible.retain(|s| *s != stage);
        self.log.push(UiCall::Hide(stage));
    }

    fn hide_loading(&mut self) {
        self.loading_visible = false;
        self.log.push(UiCall::HideLoading);
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.log.push(UiCall::Error(message.to_string()));
    }
}

/// Renderer that counts uploads instead of drawing
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub uploads: u64,
    pub last_alive: usize,
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, scene: &mut ParticleDirector) {
        self.frames += 1;
        for (_, pool) in scene.pools_mut() {
            if pool.take_redraw() {
                self.uploads += 1;
            }
        }
        self.last_alive = scene.alive_count();
    }
}
