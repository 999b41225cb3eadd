/// Cache-bustable asset names
///
/// Static assets are served under hashed names so the service worker can
/// cache them aggressively while still picking up new deployments. The
/// transform is total and deterministic; the full manifest is computed once
/// during startup and held read-only in app state.

use sha2::{Digest, Sha256};

/// Logical asset paths included in the service worker precache
pub const PRECACHED_ASSETS: &[&str] = &["/css/style.css", "/js/pwa-directory.js"];

/// Length of the hex tag spliced into hashed asset names
const TAG_LEN: usize = 8;

/// Encode a logical asset path into its cache-bustable form
///
/// Splices a short SHA-256 tag in before the file extension, so
/// `/css/style.css` becomes `/css/style.<tag>.css`. Paths without an
/// extension get the tag appended as a suffix.
pub fn hashed_path(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    let mut tag = String::with_capacity(TAG_LEN);
    for byte in &digest[..TAG_LEN / 2] {
        tag.push_str(&format!("{byte:02x}"));
    }

    // Only a dot in the final path segment counts as an extension
    let last_segment = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[last_segment..].rfind('.') {
        Some(dot) => {
            let dot = last_segment + dot;
            format!("{}.{}{}", &path[..dot], tag, &path[dot..])
        }
        None => format!("{path}.{tag}"),
    }
}

/// The startup-computed list of hashed asset paths
///
/// Built once in `create_app` and shared read-only through app state; the
/// precache route serves the pre-serialized script body verbatim on every
/// request.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    entries: Vec<String>,
    script: String,
}

impl AssetManifest {
    /// Apply the name transform to `paths` and pre-serialize the script body
    pub fn build(paths: &[&str]) -> Self {
        let entries: Vec<String> = paths.iter().map(|path| hashed_path(path)).collect();
        let literal = serde_json::to_string(&entries)
            .expect("a list of strings always serializes to JSON");
        let script = format!("const ASSETS = {literal};");
        Self { entries, script }
    }

    /// The hashed asset paths, in declaration order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The ready-to-serve script body: `const ASSETS = [...];`
    pub fn script(&self) -> &str {
        &self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_goes_before_the_extension() {
        let hashed = hashed_path("/css/style.css");
        assert!(hashed.starts_with("/css/style."));
        assert!(hashed.ends_with(".css"));
        assert_eq!(hashed.len(), "/css/style.css".len() + TAG_LEN + 1);
    }

    #[test]
    fn extensionless_path_gets_a_suffix() {
        let hashed = hashed_path("/fonts/icons");
        assert!(hashed.starts_with("/fonts/icons."));
        assert_eq!(hashed.len(), "/fonts/icons".len() + TAG_LEN + 1);
    }

    #[test]
    fn dotted_directory_does_not_confuse_the_transform() {
        let hashed = hashed_path("/v1.2/app");
        assert!(hashed.starts_with("/v1.2/app."));
    }

    #[test]
    fn transform_is_deterministic() {
        assert_eq!(hashed_path("/css/style.css"), hashed_path("/css/style.css"));
        assert_ne!(hashed_path("/css/style.css"), hashed_path("/css/other.css"));
    }

    #[test]
    fn script_is_a_json_array_assignment() {
        let manifest = AssetManifest::build(PRECACHED_ASSETS);
        let script = manifest.script();
        assert!(script.starts_with("const ASSETS = ["));
        assert!(script.ends_with("];"));

        let literal = &script["const ASSETS = ".len()..script.len() - 1];
        let parsed: Vec<String> = serde_json::from_str(literal).unwrap();
        assert_eq!(parsed, manifest.entries());
    }
}
