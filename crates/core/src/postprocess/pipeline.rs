//! Builds and runs the ordered chain of post-processing actions.
//!
//! The action set is closed: the overlay always runs before the filter so
//! annotations land on every face the filter might still reject.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::ExtractConfig;
use crate::detection::domain::recognizer::PluginFactory;
use crate::postprocess::debug_overlay::DebugOverlayAction;
use crate::postprocess::face_filter::FaceFilterAction;
use crate::postprocess::WorkingMedia;

pub enum PostProcessAction {
    DebugOverlay(DebugOverlayAction),
    FaceFilter(FaceFilterAction),
}

impl PostProcessAction {
    fn name(&self) -> &'static str {
        match self {
            Self::DebugOverlay(_) => "Debug Landmarks",
            Self::FaceFilter(_) => "Face Filter",
        }
    }

    fn process(&mut self, media: &mut WorkingMedia) {
        match self {
            Self::DebugOverlay(action) => action.process(media),
            Self::FaceFilter(action) => action.process(media),
        }
    }
}

pub struct PostProcessPipeline {
    actions: Vec<PostProcessAction>,
}

impl PostProcessPipeline {
    /// Compiles the requested actions. An action whose configuration turns
    /// out to be unusable is dropped with a warning, never a failure.
    pub fn from_config(config: &ExtractConfig, factory: &Arc<dyn PluginFactory>) -> Self {
        let mut actions = Vec::new();

        if config.debug_landmarks {
            actions.push(PostProcessAction::DebugOverlay(DebugOverlayAction::new()));
        }

        if !config.filter.is_empty() || !config.nfilter.is_empty() {
            match FaceFilterAction::build(
                &config.filter,
                &config.nfilter,
                config.ref_threshold,
                factory,
                !config.singleprocess,
            ) {
                Ok(Some(filter)) => actions.push(PostProcessAction::FaceFilter(filter)),
                Ok(None) => {}
                Err(err) => {
                    warn!("Could not initialise the face filter: {err}. This filter will not be applied.");
                }
            }
        }

        for action in &actions {
            info!("Adding post processing item: {}", action.name());
        }
        Self { actions }
    }

    pub fn process(&mut self, media: &mut WorkingMedia) {
        for action in &mut self.actions {
            debug!("Performing postprocess action: '{}'", action.name());
            action.process(media);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}
