//! Declarative description of the gallery page.
//!
//! Everything here is a pure function of the dataset and view state; turning
//! a [`PageView`] into markup happens in `gallery.rs`.

use crate::date::format_date;
use crate::lightbox::Lightbox;
use crate::listing::{FlatList, Stats, display_order};
use crate::manifest::GalleryEntry;

/// Delay between the entrance animations of consecutive sections.
pub const SECTION_STAGGER_MS: usize = 60;

/// Vertical offset past which the scroll-to-top control shows.
pub const SCROLL_TOP_THRESHOLD: f64 = 400.0;

pub const EMPTY_MESSAGE: &str = "No stories match your search.";
pub const LOADING_MESSAGE: &str = "Loading gallery…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Single,
    TwoUp,
    ThreeUp,
    Many,
}

impl Layout {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => Layout::Single,
            2 => Layout::TwoUp,
            3 => Layout::ThreeUp,
            _ => Layout::Many,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Layout::Single => "layout-1",
            Layout::TwoUp => "layout-2",
            Layout::ThreeUp => "layout-3",
            Layout::Many => "layout-many",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub src: String,
    pub date: String,
    pub flat_index: usize,
    /// `i/n` marker, only when the date has several images.
    pub badge: Option<String>,
    pub aria_label: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub date: String,
    pub label: String,
    pub count_label: String,
    pub layout: Layout,
    pub delay_ms: usize,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryBody {
    Loading,
    Failed(String),
    Empty,
    Sections(Vec<SectionView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortToggleView {
    pub ascending: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxView {
    pub index: usize,
    pub total: usize,
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub counter: String,
    pub prev_dimmed: bool,
    pub next_dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub stats: Option<Stats>,
    pub query: String,
    pub sort: SortToggleView,
    pub body: GalleryBody,
    pub lightbox: Option<LightboxView>,
    /// Page scrolling is suppressed while the lightbox is open.
    pub scroll_locked: bool,
    pub scroll_top_visible: bool,
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 story".to_string()
    } else {
        format!("{count} stories")
    }
}

pub fn sort_label(ascending: bool) -> &'static str {
    if ascending { "Oldest First" } else { "Newest First" }
}

pub fn sort_toggle(ascending: bool) -> SortToggleView {
    SortToggleView {
        ascending,
        label: sort_label(ascending),
    }
}

fn render_card(
    src: &str,
    date: &str,
    flat_index: usize,
    slot: usize,
    total_in_date: usize,
) -> CardView {
    CardView {
        src: src.to_string(),
        date: date.to_string(),
        flat_index,
        badge: (total_in_date > 1).then(|| format!("{}/{total_in_date}", slot + 1)),
        aria_label: format!("Open story from {date}"),
        alt: format!("Instagram story - {date}"),
    }
}

/// Group the visible entries into sections.
///
/// `positions` are manifest positions in manifest order; they are shown
/// newest first unless `ascending` is set. `flat` must have been built with
/// the same `ascending` flag.
pub fn render_sections(
    entries: &[GalleryEntry],
    positions: &[usize],
    flat: &FlatList,
    ascending: bool,
) -> GalleryBody {
    if positions.is_empty() {
        return GalleryBody::Empty;
    }

    let sections = display_order(positions.len(), ascending)
        .into_iter()
        .enumerate()
        .filter_map(|(section_idx, i)| {
            let position = positions[i];
            let entry = entries.get(position)?;
            let count = entry.images.len();
            let cards = entry
                .images
                .iter()
                .enumerate()
                .filter_map(|(slot, src)| {
                    let flat_index = flat.index_of(position, slot)?;
                    Some(render_card(src, &entry.date, flat_index, slot, count))
                })
                .collect();
            Some(SectionView {
                date: entry.date.clone(),
                label: format_date(&entry.date),
                count_label: count_label(count),
                layout: Layout::for_count(count),
                delay_ms: section_idx * SECTION_STAGGER_MS,
                cards,
            })
        })
        .collect();

    GalleryBody::Sections(sections)
}

pub fn render_lightbox(flat: &FlatList, lightbox: Lightbox) -> Option<LightboxView> {
    let index = lightbox.index()?;
    let item = flat.get(index)?;
    let total = flat.len();
    Some(LightboxView {
        index,
        total,
        src: item.src.clone(),
        alt: format!("Story - {}", item.date),
        caption: format_date(&item.date),
        counter: format!("{} / {total}", index + 1),
        prev_dimmed: index == 0,
        next_dimmed: index + 1 == total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{flatten, matching_positions};

    fn entry(date: &str, images: &[&str]) -> GalleryEntry {
        GalleryEntry {
            date: date.to_string(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample() -> Vec<GalleryEntry> {
        vec![
            entry("2024-03-14", &["a.jpg", "b.jpg"]),
            entry("2024-01-01", &["c.jpg"]),
        ]
    }

    fn sections(body: GalleryBody) -> Vec<SectionView> {
        match body {
            GalleryBody::Sections(s) => s,
            other => panic!("expected sections, got {other:?}"),
        }
    }

    // --- layout & labels ---

    #[test]
    fn layout_by_count() {
        assert_eq!(Layout::for_count(1), Layout::Single);
        assert_eq!(Layout::for_count(2), Layout::TwoUp);
        assert_eq!(Layout::for_count(3), Layout::ThreeUp);
        assert_eq!(Layout::for_count(4), Layout::Many);
        assert_eq!(Layout::for_count(12).class_name(), "layout-many");
    }

    #[test]
    fn count_label_plural() {
        assert_eq!(count_label(1), "1 story");
        assert_eq!(count_label(0), "0 stories");
        assert_eq!(count_label(5), "5 stories");
    }

    #[test]
    fn sort_labels() {
        assert_eq!(sort_toggle(false).label, "Newest First");
        assert_eq!(sort_toggle(true).label, "Oldest First");
    }

    // --- sections ---

    #[test]
    fn default_order_follows_manifest() {
        let entries = sample();
        let flat = flatten(&entries, false);
        let s = sections(render_sections(&entries, &[0, 1], &flat, false));
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].label, "14 March 2024");
        assert_eq!(s[0].count_label, "2 stories");
        assert_eq!(s[0].layout, Layout::TwoUp);
        assert_eq!(s[1].date, "2024-01-01");
        assert_eq!(s[1].count_label, "1 story");
    }

    #[test]
    fn ascending_reverses_sections_and_indices() {
        let entries = sample();
        let flat = flatten(&entries, true);
        let s = sections(render_sections(&entries, &[0, 1], &flat, true));
        assert_eq!(s[0].date, "2024-01-01");
        assert_eq!(s[1].date, "2024-03-14");
        assert_eq!(s[0].cards[0].flat_index, 0);
        assert_eq!(s[1].cards[0].flat_index, 1);
        assert_eq!(s[1].cards[1].flat_index, 2);
    }

    #[test]
    fn cards_resolve_to_clicked_image() {
        let entries = sample();
        for ascending in [false, true] {
            let flat = flatten(&entries, ascending);
            for section in sections(render_sections(&entries, &[0, 1], &flat, ascending)) {
                for card in section.cards {
                    assert_eq!(flat.get(card.flat_index).unwrap().src, card.src);
                }
            }
        }
    }

    #[test]
    fn filtered_cards_keep_full_list_indices() {
        let entries = sample();
        let flat = flatten(&entries, false);
        let positions = matching_positions(&entries, "jan");
        let s = sections(render_sections(&entries, &positions, &flat, false));
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].cards[0].flat_index, 2);
    }

    #[test]
    fn badges_only_for_multi_image_dates() {
        let entries = sample();
        let flat = flatten(&entries, false);
        let s = sections(render_sections(&entries, &[0, 1], &flat, false));
        assert_eq!(s[0].cards[0].badge.as_deref(), Some("1/2"));
        assert_eq!(s[0].cards[1].badge.as_deref(), Some("2/2"));
        assert_eq!(s[1].cards[0].badge, None);
        assert_eq!(s[1].cards[0].aria_label, "Open story from 2024-01-01");
    }

    #[test]
    fn sections_are_staggered() {
        let entries = sample();
        let flat = flatten(&entries, false);
        let s = sections(render_sections(&entries, &[0, 1], &flat, false));
        assert_eq!(s[0].delay_ms, 0);
        assert_eq!(s[1].delay_ms, SECTION_STAGGER_MS);
    }

    #[test]
    fn no_positions_is_empty_state() {
        let entries = sample();
        let flat = flatten(&entries, false);
        assert_eq!(render_sections(&entries, &[], &flat, false), GalleryBody::Empty);
    }

    #[test]
    fn rendering_is_idempotent() {
        let entries = sample();
        let flat = flatten(&entries, true);
        assert_eq!(
            render_sections(&entries, &[0, 1], &flat, true),
            render_sections(&entries, &[0, 1], &flat, true)
        );
    }

    // --- lightbox view ---

    #[test]
    fn lightbox_view_fields() {
        let flat = flatten(&sample(), false);
        let view = render_lightbox(&flat, Lightbox::Open(1)).unwrap();
        assert_eq!(view.src, "b.jpg");
        assert_eq!(view.alt, "Story - 2024-03-14");
        assert_eq!(view.caption, "14 March 2024");
        assert_eq!(view.counter, "2 / 3");
        assert!(!view.prev_dimmed);
        assert!(!view.next_dimmed);
    }

    #[test]
    fn lightbox_boundaries_dim_controls() {
        let flat = flatten(&sample(), false);
        let first = render_lightbox(&flat, Lightbox::Open(0)).unwrap();
        assert!(first.prev_dimmed && !first.next_dimmed);
        let last = render_lightbox(&flat, Lightbox::Open(2)).unwrap();
        assert!(!last.prev_dimmed && last.next_dimmed);
    }

    #[test]
    fn closed_lightbox_has_no_view() {
        let flat = flatten(&sample(), false);
        assert_eq!(render_lightbox(&flat, Lightbox::Closed), None);
    }
}
