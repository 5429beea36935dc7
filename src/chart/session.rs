//! Per-view chart state that isn't part of the document.

use chrono::{Local, NaiveDate};

use super::geometry;
use super::interaction::InteractionController;
use super::layout::{self, VisualTree};
use crate::model::{GanttStore, TimelineWindow};

pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 300;
pub const DEFAULT_ZOOM: u32 = 100;
pub const ZOOM_STEP: u32 = 10;

/// Zoom level, injected "today", the last computed window and the drag
/// controller.
#[derive(Debug)]
pub struct ChartSession {
    zoom: u32,
    today: NaiveDate,
    window: Option<TimelineWindow>,
    pub controller: InteractionController,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl ChartSession {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            today,
            window: None,
            controller: InteractionController::new(),
        }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, percent: u32) {
        self.zoom = percent.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom.saturating_add(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP));
    }

    pub fn chart_min_width(&self) -> f32 {
        geometry::chart_min_width(self.zoom)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    /// Window of the last layout, if one produced a chart.
    pub fn window(&self) -> Option<TimelineWindow> {
        self.window
    }

    /// Recomputes the visual tree for the current store contents.
    pub fn layout(&mut self, store: &dyn GanttStore) -> VisualTree {
        let tree = layout::compose(store, self.zoom, self.today);
        self.window = tree.window;
        tree
    }
}
