use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::controller::GalleryController;
use crate::gallery::{PageMode, generate_html};
use crate::manifest::ManifestSource;
use crate::nav::{UrlState, urldecode};

/// How often the accept loop checks for Ctrl+C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Server configuration, shared read-only by every request thread.
pub struct ServerState {
    pub dir: PathBuf,
    pub manifest: String,
}

impl ServerState {
    pub fn new(dir: &Path, manifest: &str) -> Result<Arc<Self>> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Directory not found: {}", dir.display()))?;
        if !dir.is_dir() {
            anyhow::bail!("{} is not a directory", dir.display());
        }
        Ok(Arc::new(Self {
            dir,
            manifest: manifest.to_string(),
        }))
    }

    pub fn manifest_source(&self) -> ManifestSource {
        ManifestSource::File(self.dir.join(&self.manifest))
    }

    /// Render the page for one request. The manifest is re-read every time,
    /// so a reload always picks up a fresh scan.
    pub fn render_page(&self, url: &str) -> String {
        let mut controller = GalleryController::new();
        controller.load(&self.manifest_source());
        UrlState::from_url(url).apply(&mut controller);
        generate_html(&controller.view(), PageMode::Served)
    }
}

/// MIME type from file extension.
fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "css" => "text/css",
        "js" => "application/javascript",
        _ => "application/octet-stream",
    }
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}

/// JSON error response helper.
fn json_error(status: u16, msg: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": msg }).to_string();
    Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", "application/json"))
}

/// Validate that a relative path doesn't escape the base dir.
pub fn safe_path(base: &Path, relative: &str) -> Option<PathBuf> {
    let clean = relative.replace('\\', "/");
    let escapes = Path::new(&clean)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return None;
    }
    let full = base.join(&clean);
    if full.starts_with(base) { Some(full) } else { None }
}

fn serve_file(req: Request, full_path: &Path) {
    match std::fs::File::open(full_path) {
        Ok(file) => {
            let len = file.metadata().map(|m| m.len()).unwrap_or(0);
            let mut resp = Response::from_file(file)
                .with_header(header("Content-Type", mime_type(full_path)))
                .with_header(header("Content-Length", &len.to_string()));
            // The manifest changes whenever the scanner runs
            if mime_type(full_path) == "application/json" {
                resp = resp.with_header(header("Cache-Control", "no-store"));
            }
            let _ = req.respond(resp);
        }
        Err(e) => {
            tracing::warn!(path = %full_path.display(), error = %e, "cannot open file");
            let _ = req.respond(json_error(500, "Cannot read file"));
        }
    }
}

/// Handle a single HTTP request.
pub fn handle_request(req: Request, state: &ServerState) {
    let url = req.url().to_string();
    let method = req.method().clone();
    let path = url.split('?').next().unwrap_or(&url).to_string();
    tracing::debug!(%method, %url, "request");

    match (&method, path.as_str()) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            let html = state.render_page(&url);
            let resp = Response::from_string(html)
                .with_header(header("Content-Type", "text/html; charset=utf-8"))
                .with_header(header("Cache-Control", "no-store"));
            let _ = req.respond(resp);
        }

        (&Method::Get, _) => {
            let rel = urldecode(path.strip_prefix('/').unwrap_or(&path));
            match safe_path(&state.dir, &rel) {
                Some(full_path) if full_path.is_file() => serve_file(req, &full_path),
                Some(_) => {
                    let _ = req.respond(json_error(404, "File not found"));
                }
                None => {
                    let _ = req.respond(json_error(400, "Invalid path"));
                }
            }
        }

        _ => {
            let _ = req.respond(json_error(405, "Method not allowed"));
        }
    }
}

/// Start the HTTP server and block until Ctrl+C.
pub fn run_serve(dir: &Path, port: u16, manifest: &str) -> Result<()> {
    let state = ServerState::new(dir, manifest)?;
    if !state.dir.join(&state.manifest).is_file() {
        println!(
            "  {} {} not found in {}: run scan.py first",
            console::style("!").yellow().bold(),
            state.manifest,
            state.dir.display()
        );
    }

    let addr = format!("0.0.0.0:{port}");
    let server = Server::http(&addr).map_err(|e| anyhow::anyhow!("Cannot start server: {e}"))?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_clone.store(true, Ordering::SeqCst);
    })?;

    println!(
        "  {} Gallery available at {}",
        console::style("✔").green().bold(),
        console::style(format!("http://localhost:{port}")).cyan().bold()
    );
    println!("  {} to stop", console::style("Ctrl+C").yellow().bold());

    while !stop.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(req)) => {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    handle_request(req, &state);
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
                break;
            }
        }
    }

    tracing::info!("server stopped");
    Ok(())
}
