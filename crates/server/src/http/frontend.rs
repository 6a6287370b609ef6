use axum::{
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

// Vite fingerprints build outputs as `name-<hash>.<ext>`; those may be cached
// forever. Everything else revalidates after five minutes.
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
const SHORT_CACHE: &str = "public, max-age=300";

#[derive(RustEmbed)]
#[folder = "../../frontend/dist"]
struct FrontendAssets;

pub async fn serve_frontend_root() -> Response {
    respond_with_asset("index.html")
}

pub async fn serve_frontend(Path(path): Path<String>) -> Response {
    respond_with_asset(path.trim_start_matches('/'))
}

fn respond_with_asset(path: &str) -> Response {
    if let Some(asset) = FrontendAssets::get(path) {
        return asset_response(path, asset.data.into_owned());
    }
    // Unknown paths fall through to the SPA shell so client-side routes
    // survive a page reload.
    match FrontendAssets::get("index.html") {
        Some(index) => asset_response("index.html", index.data.into_owned()),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

fn asset_response(path: &str, bytes: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let cache = if is_fingerprinted(path) {
        IMMUTABLE_CACHE
    } else {
        SHORT_CACHE
    };
    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache.to_string()),
        ],
        bytes,
    )
        .into_response()
}

/// A fingerprint is the part between the last `-` and the extension. Plain
/// words like `placeholder-property.svg` are excluded by requiring a digit
/// or an uppercase character somewhere in it.
fn is_fingerprinted(path: &str) -> bool {
    let Some((stem, _ext)) = path.rsplit_once('.') else {
        return false;
    };
    let Some((_, candidate)) = stem.rsplit_once('-') else {
        return false;
    };
    candidate.len() >= 8
        && candidate.chars().all(|ch| ch.is_ascii_alphanumeric())
        && candidate
            .chars()
            .any(|ch| ch.is_ascii_digit() || ch.is_ascii_uppercase())
}
