use std::collections::HashMap;

use crate::controller::GalleryController;
use crate::view::PageView;

/// View state carried in the page URL: `?q=<query>&sort=asc&photo=<index>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    pub query: String,
    pub ascending: bool,
    pub photo: Option<usize>,
}

impl UrlState {
    pub fn from_url(url: &str) -> Self {
        let params = parse_query(url);
        Self {
            query: params.get("q").cloned().unwrap_or_default(),
            ascending: params.get("sort").is_some_and(|s| s == "asc"),
            photo: params.get("photo").and_then(|p| p.parse().ok()),
        }
    }

    /// The state a rendered page was built from.
    pub fn of_view(view: &PageView) -> Self {
        Self {
            query: view.query.clone(),
            ascending: view.sort.ascending,
            photo: view.lightbox.as_ref().map(|lb| lb.index),
        }
    }

    /// Replay this state onto a freshly loaded controller.
    ///
    /// Sorting goes first because toggling the sort clears the search.
    pub fn apply(&self, controller: &mut GalleryController) {
        if self.ascending {
            controller.toggle_sort();
        }
        if !self.query.is_empty() {
            controller.search(&self.query);
        }
        if let Some(index) = self.photo {
            controller.open(index);
        }
    }

    pub fn with_photo(&self, photo: Option<usize>) -> Self {
        Self {
            photo,
            ..self.clone()
        }
    }

    /// Flipped sort order with the search dropped.
    pub fn toggled_sort(&self) -> Self {
        Self {
            query: String::new(),
            ascending: !self.ascending,
            photo: None,
        }
    }

    pub fn to_href(&self) -> String {
        let mut parts = Vec::new();
        if !self.query.is_empty() {
            parts.push(format!("q={}", urlencode(&self.query)));
        }
        if self.ascending {
            parts.push("sort=asc".to_string());
        }
        if let Some(photo) = self.photo {
            parts.push(format!("photo={photo}"));
        }
        format!("?{}", parts.join("&"))
    }
}

/// Parse query string into key-value pairs.
pub fn parse_query(url: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(qs) = url.split_once('?').map(|(_, qs)| qs) {
        for pair in qs.split('&') {
            let mut kv = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (kv.next(), kv.next()) {
                params.insert(urldecode(k), urldecode(v));
            }
        }
    }
    params
}

/// Minimal URL decode (%XX and +).
pub fn urldecode(s: &str) -> String {
    let mut result = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(val) =
                u8::from_str_radix(&String::from_utf8_lossy(&bytes[i + 1..i + 3]), 16)
            {
                result.push(val);
                i += 3;
                continue;
            }
        }
        if bytes[i] == b'+' {
            result.push(b' ');
        } else {
            result.push(bytes[i]);
        }
        i += 1;
    }
    String::from_utf8_lossy(&result).to_string()
}

/// Percent-encode everything outside the unreserved set.
pub fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest;

    // --- parse_query ---

    #[test]
    fn parse_query_extracts_params() {
        let params = parse_query("/?q=jan&sort=asc");
        assert_eq!(params.get("q").unwrap(), "jan");
        assert_eq!(params.get("sort").unwrap(), "asc");
    }

    #[test]
    fn parse_query_empty_when_no_query() {
        assert!(parse_query("/").is_empty());
    }

    // --- urldecode / urlencode ---

    #[test]
    fn urldecode_decodes_percent_and_plus() {
        assert_eq!(urldecode("hello+world"), "hello world");
        assert_eq!(urldecode("hello%20world"), "hello world");
        assert_eq!(urldecode("a%2Fb"), "a/b");
        assert_eq!(urldecode("100%"), "100%");
    }

    #[test]
    fn urlencode_escapes_reserved() {
        assert_eq!(urlencode("14 march"), "14%20march");
        assert_eq!(urlencode("a&b=c"), "a%26b%3Dc");
        assert_eq!(urlencode("2024-03-14"), "2024-03-14");
        assert_eq!(urldecode(&urlencode("août & été")), "août & été");
    }

    // --- UrlState ---

    #[test]
    fn from_url_reads_state() {
        let state = UrlState::from_url("/?q=14+march&sort=asc&photo=2");
        assert_eq!(state.query, "14 march");
        assert!(state.ascending);
        assert_eq!(state.photo, Some(2));
    }

    #[test]
    fn from_url_ignores_bad_values() {
        let state = UrlState::from_url("/?sort=desc&photo=-1");
        assert_eq!(state, UrlState::default());
    }

    #[test]
    fn href_contains_only_set_fields() {
        assert_eq!(UrlState::default().to_href(), "?");
        let state = UrlState {
            query: "jan".into(),
            ascending: true,
            photo: Some(0),
        };
        assert_eq!(state.to_href(), "?q=jan&sort=asc&photo=0");
        assert_eq!(UrlState::from_url(&state.to_href()), state);
    }

    #[test]
    fn toggled_sort_drops_search_and_photo() {
        let state = UrlState {
            query: "jan".into(),
            ascending: false,
            photo: Some(1),
        };
        assert_eq!(state.toggled_sort().to_href(), "?sort=asc");
    }

    #[test]
    fn apply_replays_onto_controller() {
        let mut c = GalleryController::new();
        c.finish_load(parse_manifest(
            r#"[{"date":"2024-03-14","images":["a.jpg","b.jpg"]},{"date":"2024-01-01","images":["c.jpg"]}]"#,
        ));
        UrlState::from_url("/?q=march&sort=asc&photo=1").apply(&mut c);

        let view = c.view();
        assert_eq!(view.query, "march");
        assert!(view.sort.ascending);
        assert_eq!(view.lightbox.as_ref().unwrap().src, "a.jpg");
        assert_eq!(UrlState::of_view(&view).to_href(), "?q=march&sort=asc&photo=1");
    }
}
