use crate::date::format_date;
use crate::manifest::GalleryEntry;

/// Shown as the latest date when the manifest is empty.
pub const NO_DATE_PLACEHOLDER: &str = "—";

/// One image in lightbox traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatImage {
    pub src: String,
    pub date: String,
    pub index: usize,
}

/// All images across all entries, in display order.
///
/// `starts[p]` is the flat index of the first image of the entry at manifest
/// position `p`, so cards resolve their index without searching by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatList {
    images: Vec<FlatImage>,
    starts: Vec<usize>,
}

impl FlatList {
    pub fn images(&self) -> &[FlatImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatImage> {
        self.images.get(index)
    }

    /// Flat index of image `slot` of the entry at manifest position `position`.
    pub fn index_of(&self, position: usize, slot: usize) -> Option<usize> {
        self.starts.get(position).map(|start| start + slot)
    }

    pub fn sources(&self) -> Vec<&str> {
        self.images.iter().map(|img| img.src.as_str()).collect()
    }
}

/// Manifest positions in display order.
pub fn display_order(count: usize, ascending: bool) -> Vec<usize> {
    if ascending {
        (0..count).rev().collect()
    } else {
        (0..count).collect()
    }
}

pub fn flatten(entries: &[GalleryEntry], ascending: bool) -> FlatList {
    let mut images = Vec::with_capacity(entries.iter().map(|e| e.images.len()).sum());
    let mut starts = vec![0; entries.len()];
    for position in display_order(entries.len(), ascending) {
        let entry = &entries[position];
        starts[position] = images.len();
        for src in &entry.images {
            images.push(FlatImage {
                src: src.clone(),
                date: entry.date.clone(),
                index: images.len(),
            });
        }
    }
    FlatList { images, starts }
}

fn matches_query(entry: &GalleryEntry, needle: &str) -> bool {
    entry.date.to_lowercase().contains(needle)
        || format_date(&entry.date).to_lowercase().contains(needle)
}

/// Manifest positions of the entries matching `query`, in manifest order.
pub fn matching_positions(entries: &[GalleryEntry], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return (0..entries.len()).collect();
    }
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_query(entry, &needle))
        .map(|(position, _)| position)
        .collect()
}

/// Entries whose raw or formatted date contains `query`, ignoring case.
/// A blank query keeps every entry.
pub fn filter_by_query<'a>(entries: &'a [GalleryEntry], query: &str) -> Vec<&'a GalleryEntry> {
    matching_positions(entries, query)
        .into_iter()
        .map(|position| &entries[position])
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub date_count: usize,
    pub image_count: usize,
    pub latest_date: String,
}

pub fn compute_stats(entries: &[GalleryEntry]) -> Stats {
    Stats {
        date_count: entries.len(),
        image_count: entries.iter().map(|e| e.images.len()).sum(),
        latest_date: entries
            .first()
            .map(|e| e.date.clone())
            .unwrap_or_else(|| NO_DATE_PLACEHOLDER.to_string()),
    }
}
