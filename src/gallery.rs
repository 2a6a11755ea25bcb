use anyhow::{Context, Result};
use console::style;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::controller::GalleryController;
use crate::lightbox::SWIPE_THRESHOLD;
use crate::listing::NO_DATE_PLACEHOLDER;
use crate::manifest::ManifestSource;
use crate::nav::UrlState;
use crate::view::{
    CardView, EMPTY_MESSAGE, GalleryBody, LOADING_MESSAGE, LightboxView, PageView,
    SCROLL_TOP_THRESHOLD, SectionView,
};

/// Opacity of a prev/next control that has nowhere to go.
const DIMMED_OPACITY: &str = "0.3";

/// Idle time after the last keystroke before the search form is submitted.
const SEARCH_DEBOUNCE_MS: u64 = 250;

const STYLE: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{background:#0a0a0a;color:#e0e0e0;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;overflow-x:hidden}
body.no-scroll{overflow:hidden}
a{color:inherit;text-decoration:none}
header{position:sticky;top:0;z-index:100;background:rgba(10,10,10,.95);backdrop-filter:blur(12px);padding:1rem 2rem;display:flex;justify-content:space-between;align-items:center;gap:1rem;flex-wrap:wrap;border-bottom:1px solid #222}
header h1{font-size:1.2rem;font-weight:600;color:#e1306c}
.stats{display:flex;gap:1.5rem;font-size:.8rem;color:#888}
.stats strong{display:block;font-size:1.1rem;color:#e0e0e0}
.controls{display:flex;gap:.5rem;align-items:center}
.controls input{background:#1a1a1a;color:#e0e0e0;border:1px solid #333;padding:.4rem .8rem;border-radius:6px;font-size:.85rem;min-width:14rem}
.sort-btn{background:#1a1a1a;color:#ccc;border:1px solid #333;padding:.4rem .8rem;border-radius:6px;font-size:.85rem;transition:all .2s}
.sort-btn:hover,.sort-btn.active{background:#e1306c;color:#fff;border-color:#e1306c}
main{padding:1rem 2rem 4rem}
.state-msg{margin:4rem auto;text-align:center;color:#777}
.state-msg.error{color:#e57373}
.date-section{margin:2rem 0;opacity:0;animation:fade-in .4s ease forwards}
@keyframes fade-in{to{opacity:1}}
.date-header{display:flex;align-items:baseline;gap:.8rem;margin-bottom:1rem}
.date-label{font-size:1.4rem;font-weight:300}
.date-count{font-size:.85rem;color:#666}
.photo-grid{display:grid;gap:8px}
.photo-grid.layout-1{grid-template-columns:minmax(0,360px)}
.photo-grid.layout-2{grid-template-columns:repeat(2,minmax(0,300px))}
.photo-grid.layout-3{grid-template-columns:repeat(3,minmax(0,260px))}
.photo-grid.layout-many{grid-template-columns:repeat(auto-fill,minmax(180px,1fr))}
.photo-card{position:relative;display:block;aspect-ratio:9/16;overflow:hidden;border-radius:8px;cursor:pointer;background:#151515;transition:transform .2s}
.photo-card:hover,.photo-card:focus{transform:scale(1.02);z-index:1}
.photo-card img{width:100%;height:100%;object-fit:cover}
div.photo-card{cursor:default}
.query-label{font-size:.85rem;color:#888}
.card-overlay{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;background:rgba(0,0,0,.4);opacity:0;transition:opacity .2s}
.photo-card:hover .card-overlay{opacity:1}
.card-overlay-text{font-size:.9rem;letter-spacing:.1em;text-transform:uppercase}
.card-index{position:absolute;top:.5rem;right:.5rem;background:rgba(0,0,0,.6);padding:.1rem .4rem;border-radius:10px;font-size:.7rem}

/* Lightbox */
.lightbox{position:fixed;inset:0;z-index:1000;background:rgba(0,0,0,.95);display:flex;flex-direction:column;align-items:center;justify-content:center}
.lightbox img{max-width:95vw;max-height:82vh;object-fit:contain;border-radius:6px;user-select:none}
.lb-close{position:absolute;top:1rem;right:1.5rem;font-size:2rem;color:#888;z-index:1002}
.lb-close:hover{color:#fff}
.lb-nav{position:absolute;top:50%;transform:translateY(-50%);font-size:3rem;color:#777;user-select:none;padding:1rem}
.lb-nav:hover{color:#fff}
.lb-prev{left:1rem}
.lb-next{right:1rem}
.lb-info{margin-top:1rem;text-align:center;color:#999;font-size:.9rem}
#lightbox-caption{color:#e0e0e0;font-weight:500}

.scroll-top{position:fixed;right:1.5rem;bottom:1.5rem;width:2.6rem;height:2.6rem;border-radius:50%;border:1px solid #333;background:#1a1a1a;color:#ccc;font-size:1.2rem;cursor:pointer;opacity:0;pointer-events:none;transition:opacity .2s}
.scroll-top.visible{opacity:1;pointer-events:auto}

@media(max-width:600px){
  header{padding:.8rem 1rem}
  main{padding:.5rem 1rem}
  .photo-grid.layout-2,.photo-grid.layout-3,.photo-grid.layout-many{grid-template-columns:repeat(2,1fr)}
}
"#;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn stats_html(view: &PageView) -> String {
    let (dates, images, latest) = match &view.stats {
        Some(s) => (
            s.date_count.to_string(),
            s.image_count.to_string(),
            s.latest_date.clone(),
        ),
        None => (
            NO_DATE_PLACEHOLDER.to_string(),
            NO_DATE_PLACEHOLDER.to_string(),
            NO_DATE_PLACEHOLDER.to_string(),
        ),
    };
    format!(
        "<div class=\"stats\">\
         <span><strong id=\"stat-dates\">{}</strong>dates</span>\
         <span><strong id=\"stat-images\">{}</strong>stories</span>\
         <span><strong id=\"stat-latest\">{}</strong>latest</span>\
         </div>",
        escape_html(&dates),
        escape_html(&images),
        escape_html(&latest)
    )
}

fn controls_html(view: &PageView, links: Option<&UrlState>) -> String {
    let active = if view.sort.ascending { " active" } else { "" };
    let Some(here) = links else {
        let filter = if view.query.is_empty() {
            String::new()
        } else {
            format!(
                "<span class=\"query-label\">Dates matching “{}”</span>",
                escape_html(&view.query)
            )
        };
        return format!(
            "<div class=\"controls\">{filter}\
             <span id=\"sort-btn\" class=\"sort-btn{active}\">\
             <span class=\"sort-label\">{label}</span></span>\
             </div>",
            label = view.sort.label,
        );
    };

    let sort_hidden = if view.sort.ascending {
        "<input type=\"hidden\" name=\"sort\" value=\"asc\">"
    } else {
        ""
    };
    format!(
        "<div class=\"controls\">\
         <form method=\"get\" action=\"\" role=\"search\">\
         <input type=\"search\" id=\"search-input\" name=\"q\" value=\"{query}\" \
         placeholder=\"Search dates…\" autocomplete=\"off\">{sort_hidden}</form>\
         <a id=\"sort-btn\" class=\"sort-btn{active}\" href=\"{href}\">\
         <span class=\"sort-label\">{label}</span></a>\
         </div>",
        query = escape_html(&view.query),
        href = escape_html(&here.toggled_sort().to_href()),
        label = view.sort.label,
    )
}

fn card_html(card: &CardView, links: Option<&UrlState>) -> String {
    let inner = format!(
        "<img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\" decoding=\"async\">",
        src = escape_html(&card.src),
        alt = escape_html(&card.alt),
    );
    let mut html = match links {
        Some(here) => format!(
            "<a class=\"photo-card\" role=\"button\" tabindex=\"0\" aria-label=\"{aria}\" href=\"{href}\">\
             {inner}<div class=\"card-overlay\"><span class=\"card-overlay-text\">View</span></div>",
            aria = escape_html(&card.aria_label),
            href = escape_html(&here.with_photo(Some(card.flat_index)).to_href()),
        ),
        None => format!("<div class=\"photo-card\">{inner}"),
    };
    if let Some(badge) = &card.badge {
        let _ = write!(html, "<span class=\"card-index\">{}</span>", escape_html(badge));
    }
    html.push_str(if links.is_some() { "</a>" } else { "</div>" });
    html
}

fn section_html(section: &SectionView, links: Option<&UrlState>) -> String {
    let cards: String = section.cards.iter().map(|c| card_html(c, links)).collect();
    format!(
        "<section class=\"date-section\" data-date=\"{date}\" style=\"animation-delay:{delay}ms\">\n\
         <div class=\"date-header\"><span class=\"date-label\">{label}</span>\
         <span class=\"date-count\">{count}</span></div>\n\
         <div class=\"photo-grid {layout}\">{cards}</div>\n\
         </section>\n",
        date = escape_html(&section.date),
        delay = section.delay_ms,
        label = escape_html(&section.label),
        count = escape_html(&section.count_label),
        layout = section.layout.class_name(),
    )
}

fn body_html(body: &GalleryBody, links: Option<&UrlState>) -> String {
    match body {
        GalleryBody::Loading => {
            format!("<div id=\"loading-state\" class=\"state-msg\">{LOADING_MESSAGE}</div>")
        }
        GalleryBody::Failed(message) => format!(
            "<div id=\"loading-state\" class=\"state-msg error\">{}</div>",
            escape_html(message)
        ),
        GalleryBody::Empty => {
            format!("<div id=\"empty-state\" class=\"state-msg\">{EMPTY_MESSAGE}</div>")
        }
        GalleryBody::Sections(sections) => {
            sections.iter().map(|s| section_html(s, links)).collect()
        }
    }
}

fn lightbox_image_html(lb: &LightboxView) -> String {
    format!(
        "<img id=\"lightbox-img\" src=\"{src}\" alt=\"{alt}\" tabindex=\"-1\">\n\
         <div class=\"lb-info\"><div id=\"lightbox-caption\">{caption}</div>\
         <div id=\"lightbox-counter\">{counter}</div></div>\n",
        src = escape_html(&lb.src),
        alt = escape_html(&lb.alt),
        caption = escape_html(&lb.caption),
        counter = escape_html(&lb.counter),
    )
}

fn lightbox_html(lb: &LightboxView, links: Option<&UrlState>) -> String {
    let Some(here) = links else {
        return format!(
            "<div class=\"lightbox open\" id=\"lightbox\" role=\"dialog\" aria-modal=\"true\">\n{}</div>\n",
            lightbox_image_html(lb)
        );
    };

    let prev = lb.index.checked_sub(1).unwrap_or(lb.index);
    let next = if lb.index + 1 < lb.total { lb.index + 1 } else { lb.index };
    let close_href = escape_html(&here.with_photo(None).to_href());
    let prev_href = escape_html(&here.with_photo(Some(prev)).to_href());
    let next_href = escape_html(&here.with_photo(Some(next)).to_href());
    let opacity = |dimmed: bool| if dimmed { DIMMED_OPACITY } else { "1" };
    format!(
        "<div class=\"lightbox open\" id=\"lightbox\" role=\"dialog\" aria-modal=\"true\" \
         data-close=\"{close_href}\" data-prev=\"{prev_href}\" data-next=\"{next_href}\">\n\
         <a class=\"lb-close\" id=\"lightbox-close\" href=\"{close_href}\" aria-label=\"Close\">&times;</a>\n\
         <a class=\"lb-nav lb-prev\" id=\"lightbox-prev\" href=\"{prev_href}\" aria-label=\"Previous\" style=\"opacity:{prev_opacity}\">&#8249;</a>\n\
         <a class=\"lb-nav lb-next\" id=\"lightbox-next\" href=\"{next_href}\" aria-label=\"Next\" style=\"opacity:{next_opacity}\">&#8250;</a>\n\
         {image}</div>\n",
        prev_opacity = opacity(lb.prev_dimmed),
        next_opacity = opacity(lb.next_dimmed),
        image = lightbox_image_html(lb),
    )
}

fn scroll_top_script() -> String {
    format!(
        r#"const toTop=document.getElementById('scroll-top');
window.addEventListener('scroll',()=>{{toTop.classList.toggle('visible',window.scrollY>{scroll});}});
toTop.addEventListener('click',()=>window.scrollTo({{top:0,behavior:'smooth'}}));"#,
        scroll = SCROLL_TOP_THRESHOLD,
    )
}

fn navigation_script() -> String {
    format!(
        r#"const go=(href)=>{{if(href)window.location.href=href;}};
const lb=document.getElementById('lightbox');
if(lb){{
  document.getElementById('lightbox-img').focus();
  document.addEventListener('keydown',e=>{{
    if(e.key==='Escape')go(lb.dataset.close);
    if(e.key==='ArrowLeft')go(lb.dataset.prev);
    if(e.key==='ArrowRight')go(lb.dataset.next);
  }});
  lb.addEventListener('click',e=>{{if(e.target===lb)go(lb.dataset.close);}});
  let touchStartX=0;
  lb.addEventListener('touchstart',e=>{{touchStartX=e.touches[0].clientX;}},{{passive:true}});
  lb.addEventListener('touchend',e=>{{
    const delta=touchStartX-e.changedTouches[0].clientX;
    if(Math.abs(delta)>{swipe})go(delta>0?lb.dataset.next:lb.dataset.prev);
  }});
}}
document.querySelectorAll('.photo-card').forEach(card=>{{
  card.addEventListener('keydown',e=>{{if(e.key===' '){{e.preventDefault();card.click();}}}});
}});
const search=document.getElementById('search-input');
if(search){{
  let pending=null;
  search.addEventListener('input',()=>{{
    clearTimeout(pending);
    pending=setTimeout(()=>search.form.submit(),{debounce});
  }});
  if(search.value){{search.focus();search.setSelectionRange(search.value.length,search.value.length);}}
}}
"#,
        swipe = SWIPE_THRESHOLD,
        debounce = SEARCH_DEBOUNCE_MS,
    )
}

/// How the committed page reacts to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Controls are links carrying the view state; `serve` answers each one.
    Served,
    /// A frozen file: no search box, no card or lightbox links.
    Snapshot,
}

/// Build the full HTML page for a view.
pub fn generate_html(view: &PageView, mode: PageMode) -> String {
    let here = UrlState::of_view(view);
    let links = match mode {
        PageMode::Served => Some(&here),
        PageMode::Snapshot => None,
    };
    let lightbox = view
        .lightbox
        .as_ref()
        .map(|lb| lightbox_html(lb, links))
        .unwrap_or_default();
    let navigation = match mode {
        PageMode::Served => navigation_script(),
        PageMode::Snapshot => String::new(),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Story Gallery</title>
<style>{style}</style>
</head>
<body{body_class}>
<header>
  <h1>Story Gallery</h1>
  {stats}
  {controls}
</header>
<main id="gallery">
{body}</main>
{lightbox}<button id="scroll-top" class="scroll-top{top_visible}" aria-label="Back to top">&#8593;</button>
<script>(function(){{
"use strict";
{navigation}{scroll_top}
}})();</script>
</body>
</html>"##,
        style = STYLE,
        body_class = if view.scroll_locked { " class=\"no-scroll\"" } else { "" },
        stats = stats_html(view),
        controls = controls_html(view, links),
        body = body_html(&view.body, links),
        top_visible = if view.scroll_top_visible { " visible" } else { "" },
        scroll_top = scroll_top_script(),
    )
}

/// Load the manifest, replay `state` and write the resulting page as a
/// non-interactive snapshot; `serve` is the interactive surface.
///
/// A failed load still writes the page with the failure message in place of
/// the gallery.
pub fn run_render(source: &ManifestSource, output: Option<PathBuf>, state: &UrlState) -> Result<()> {
    let mut controller = GalleryController::new();
    controller.load(source);
    state.apply(&mut controller);
    let view = controller.view();

    let output_path = match output {
        Some(p) => p,
        None => source
            .parent_dir()
            .unwrap_or_else(|| Path::new("."))
            .join("gallery.html"),
    };
    std::fs::write(&output_path, generate_html(&view, PageMode::Snapshot))
        .with_context(|| format!("Cannot write {}", output_path.display()))?;

    match controller.stats() {
        Some(stats) => println!(
            "  {} {} dates, {} stories → {}",
            style("✔").green().bold(),
            stats.date_count,
            stats.image_count,
            output_path.display()
        ),
        None => println!(
            "  {} Could not load {}; wrote the error page to {}",
            style("!").yellow().bold(),
            source,
            output_path.display()
        ),
    }
    Ok(())
}
