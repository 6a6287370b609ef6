use std::path::Path;

use rand::Rng;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// Builds a collision-resistant storage name: `{prefix}_{millis}_{random}.{ext}`.
/// The extension comes from the original name, falling back to `jpg`.
pub fn generate_file_name(original_name: &str, prefix: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let random: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    let ext = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or("jpg");
    format!("{prefix}_{timestamp}_{random}.{ext}")
}
