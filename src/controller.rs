use crate::lightbox::{Lightbox, swipe_direction};
use crate::listing::{FlatList, Stats, compute_stats, flatten, matching_positions};
use crate::manifest::{GalleryEntry, LOAD_FAILED_MESSAGE, LoadError, ManifestSource};
use crate::view::{
    GalleryBody, PageView, SCROLL_TOP_THRESHOLD, render_lightbox, render_sections, sort_toggle,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready(Vec<GalleryEntry>),
    Failed(String),
}

/// Transient browsing state, reset only by reloading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub sort_ascending: bool,
    pub active_query: String,
    pub lightbox: Lightbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prev,
    Next,
    Close,
}

/// Everything the page can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Search(String),
    ToggleSort,
    CardClick(usize),
    CardKey { index: usize, key: Key },
    Control(Control),
    Backdrop,
    Key(Key),
    Swipe { start_x: f64, end_x: f64 },
    Scroll(f64),
    ScrollTopClick,
}

/// What the display layer has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Render,
    ScrollToTop,
}

impl Effect {
    fn render_if(changed: bool) -> Self {
        if changed { Effect::Render } else { Effect::None }
    }
}

/// Owns the dataset and all view state for one page load.
#[derive(Debug, Clone)]
pub struct GalleryController {
    phase: Phase,
    state: ViewState,
    flat: FlatList,
    visible: Vec<usize>,
    scroll_top_visible: bool,
}

impl Default for GalleryController {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            state: ViewState::default(),
            flat: FlatList::default(),
            visible: Vec::new(),
            scroll_top_visible: false,
        }
    }

    /// Fetch the manifest and enter either the ready or the failed phase.
    pub fn load(&mut self, source: &ManifestSource) -> Effect {
        self.finish_load(source.load())
    }

    pub fn finish_load(&mut self, result: Result<Vec<GalleryEntry>, LoadError>) -> Effect {
        match result {
            Ok(entries) => {
                let stats = compute_stats(&entries);
                tracing::info!(
                    dates = stats.date_count,
                    images = stats.image_count,
                    latest = %stats.latest_date,
                    "gallery data loaded"
                );
                self.visible = (0..entries.len()).collect();
                self.flat = flatten(&entries, self.state.sort_ascending);
                self.phase = Phase::Ready(entries);
            }
            Err(e) => {
                tracing::error!(error = %e, "could not load gallery data");
                self.visible.clear();
                self.flat = FlatList::default();
                self.phase = Phase::Failed(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        Effect::Render
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn flat(&self) -> &FlatList {
        &self.flat
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        match &self.phase {
            Phase::Ready(entries) => entries,
            _ => &[],
        }
    }

    pub fn stats(&self) -> Option<Stats> {
        match &self.phase {
            Phase::Ready(entries) => Some(compute_stats(entries)),
            _ => None,
        }
    }

    /// Filter the rendered sections. The dataset itself is never touched.
    pub fn search(&mut self, query: &str) -> Effect {
        let Phase::Ready(entries) = &self.phase else {
            return Effect::None;
        };
        self.visible = matching_positions(entries, query);
        self.state.active_query = query.to_string();
        tracing::debug!(query, matches = self.visible.len(), "search");
        Effect::Render
    }

    /// Flip the sort order. This drops any active search and shows
    /// the whole dataset again.
    pub fn toggle_sort(&mut self) -> Effect {
        let Phase::Ready(entries) = &self.phase else {
            return Effect::None;
        };
        self.state.sort_ascending = !self.state.sort_ascending;
        self.state.active_query.clear();
        self.flat = flatten(entries, self.state.sort_ascending);
        self.visible = (0..entries.len()).collect();
        tracing::debug!(ascending = self.state.sort_ascending, "sort toggled");
        Effect::Render
    }

    pub fn open(&mut self, index: usize) -> Effect {
        let changed = self.state.lightbox.open(index, self.flat.len());
        if changed {
            tracing::debug!(index, "lightbox opened");
        }
        Effect::render_if(changed)
    }

    pub fn step(&mut self, delta: isize) -> Effect {
        Effect::render_if(self.state.lightbox.step(delta, self.flat.len()))
    }

    pub fn close(&mut self) -> Effect {
        Effect::render_if(self.state.lightbox.close())
    }

    /// Track the scroll-to-top button for a live host. A committed page starts
    /// at offset zero and its inline script toggles the button from there.
    pub fn on_scroll(&mut self, offset: f64) -> Effect {
        let visible = offset > SCROLL_TOP_THRESHOLD;
        let changed = visible != self.scroll_top_visible;
        self.scroll_top_visible = visible;
        Effect::render_if(changed)
    }

    /// Dispatch one user input. Committed pages route input through `UrlState`
    /// links instead, so only hosts that hold the controller between events
    /// call this.
    pub fn handle(&mut self, input: Input) -> Effect {
        // Overlay-bound inputs only exist while the overlay is showing
        let overlay_input = matches!(input, Input::Backdrop | Input::Key(_) | Input::Swipe { .. });
        if overlay_input && !self.state.lightbox.is_open() {
            return Effect::None;
        }

        match input {
            Input::Search(query) => self.search(&query),
            Input::ToggleSort => self.toggle_sort(),
            Input::CardClick(index) => self.open(index),
            Input::CardKey { index, key } => match key {
                Key::Enter | Key::Space => self.open(index),
                _ => Effect::None,
            },
            Input::Control(Control::Prev) => self.step(-1),
            Input::Control(Control::Next) => self.step(1),
            Input::Control(Control::Close) => self.close(),
            Input::Backdrop => self.close(),
            Input::Key(Key::Escape) => self.close(),
            Input::Key(Key::ArrowLeft) => self.step(-1),
            Input::Key(Key::ArrowRight) => self.step(1),
            Input::Key(_) => Effect::None,
            Input::Swipe { start_x, end_x } => match swipe_direction(start_x, end_x) {
                Some(delta) => self.step(delta),
                None => Effect::None,
            },
            Input::Scroll(offset) => self.on_scroll(offset),
            Input::ScrollTopClick => Effect::ScrollToTop,
        }
    }

    pub fn view(&self) -> PageView {
        let body = match &self.phase {
            Phase::Loading => GalleryBody::Loading,
            Phase::Failed(message) => GalleryBody::Failed(message.clone()),
            Phase::Ready(entries) => render_sections(
                entries,
                &self.visible,
                &self.flat,
                self.state.sort_ascending,
            ),
        };
        let lightbox = render_lightbox(&self.flat, self.state.lightbox);
        PageView {
            stats: self.stats(),
            query: self.state.active_query.clone(),
            sort: sort_toggle(self.state.sort_ascending),
            body,
            scroll_locked: lightbox.is_some(),
            lightbox,
            scroll_top_visible: self.scroll_top_visible,
        }
    }
}
