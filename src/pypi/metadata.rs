// SPDX-License-Identifier: MPL-2.0

//! Parsing for the three PyPI payload shapes this crate consumes: Simple API
//! pages, wheel `.metadata` files (RFC 822-like headers), and JSON API bodies.

use std::collections::HashMap;

use url::Url;

use super::error::PyPIError;

/// One wheel file discovered on a Simple API page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFile {
    /// Filename as it appeared in the page, e.g. `foo-1.2.3-py3-none-any.whl`.
    pub filename: String,
    /// Absolute URL to the wheel, with any `#sha256=...` fragment stripped.
    pub url: Url,
    /// Whether the page advertised PEP 658 `.metadata` availability for this file.
    pub metadata_available: bool,
    /// Version string extracted from `filename` by [parse_wheel_version].
    pub version: String,
}

/// Extracts the version component of a wheel (or sdist) filename using the
/// standard rule: the first hyphen followed by a digit marks the start of the
/// version, which then runs to the next hyphen or to a `.tar.gz`/`.zip` suffix.
pub fn parse_wheel_version(filename: &str) -> Option<&str> {
    let bytes = filename.as_bytes();
    let mut start = None;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'-' && bytes[i + 1].is_ascii_digit() {
            start = Some(i + 1);
            break;
        }
        i += 1;
    }
    let start = start?;
    let rest = &filename[start..];
    let end = rest
        .find('-')
        .or_else(|| rest.find(".tar.gz"))
        .or_else(|| rest.find(".zip"))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Relative desirability of a wheel candidate for a given version: higher is
/// preferred. A pure function of the file info alone, independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WheelScore {
    /// Whether PEP 658 metadata is announced for this file.
    metadata_available: bool,
    /// Whether this is a universal (py3-none-any-ish) wheel.
    is_universal: bool,
}

/// Scores a wheel filename for the "pick one file per version" preference
/// rule: metadata-available first, then universal tags, else first-found.
pub fn score(filename: &str, metadata_available: bool) -> WheelScore {
    let is_universal = filename.contains("-py3-none-any")
        || filename.contains("-py2.py3-none-any")
        || filename.contains("-py2-none-any");
    WheelScore {
        metadata_available,
        is_universal,
    }
}

/// Picks the best wheel per version, breaking ties by insertion order (the
/// first-found file wins among files with equal [WheelScore]).
pub fn best_per_version(files: Vec<WheelFile>) -> HashMap<String, WheelFile> {
    let mut best: HashMap<String, (WheelScore, WheelFile)> = HashMap::new();
    for file in files {
        let s = score(&file.filename, file.metadata_available);
        match best.get(&file.version) {
            Some((existing_score, _)) if *existing_score >= s => {}
            _ => {
                best.insert(file.version.clone(), (s, file));
            }
        }
    }
    best.into_iter().map(|(k, (_, v))| (k, v)).collect()
}

/// Parses a Simple API HTML (or HTML-compatible JSON-as-HTML) page, returning
/// every `.whl` anchor found.
pub fn parse_simple_api_page(base: &Url, body: &str) -> Result<Vec<WheelFile>, PyPIError> {
    let dom = tl::parse(body, tl::ParserOptions::default())
        .map_err(|_| PyPIError::ParseError("malformed Simple API HTML".to_string()))?;
    let parser = dom.parser();
    let mut files = Vec::new();
    let Some(anchors) = dom.query_selector("a") else {
        return Ok(files);
    };
    for handle in anchors {
        let Some(node) = handle.get(parser) else {
            continue;
        };
        let Some(tag) = node.as_tag() else {
            continue;
        };
        let attrs = tag.attributes();
        let Some(href) = attrs.get("href").flatten() else {
            continue;
        };
        let href = html_escape::decode_html_entities(href.as_utf8_str().as_ref()).into_owned();
        let Ok(mut url) = base.join(&href) else {
            continue;
        };
        url.set_fragment(None);
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        if !filename.ends_with(".whl") {
            continue;
        }
        let metadata_available = attrs.get("data-dist-info-metadata").is_some()
            || attrs.get("data-core-metadata").is_some()
            || attrs.get("core-metadata").is_some();
        let Some(version) = parse_wheel_version(&filename) else {
            continue;
        };
        files.push(WheelFile {
            version: version.to_string(),
            filename,
            url,
            metadata_available,
        });
    }
    Ok(files)
}

/// Metadata extracted from a wheel's PEP 658 `.metadata` file (or, after
/// fallback, synthesized from the JSON API response).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// `Version` header.
    pub version: String,
    /// `Requires-Python` header, if present.
    pub requires_python: Option<String>,
    /// Every `Requires-Dist` header value, in header order.
    pub requires_dist: Vec<String>,
}

/// Parses an RFC 822-like wheel METADATA file. Only `Version`,
/// `Requires-Python`, and `Requires-Dist` are extracted; everything else
/// (including the free-text body after the first blank line) is ignored.
/// Continuation lines (leading space/tab) are ignored, per the wheel METADATA
/// convention of folding long `Description` bodies onto indented lines that
/// this parser has no use for.
pub fn parse_metadata_text(text: &str) -> Result<PackageMetadata, PyPIError> {
    let mut version = None;
    let mut requires_python = None;
    let mut requires_dist = Vec::new();

    for line in text.lines() {
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Version" => version = Some(value),
            "Requires-Python" => requires_python = Some(value),
            "Requires-Dist" => requires_dist.push(value),
            _ => {}
        }
    }

    let version = version.ok_or_else(|| {
        PyPIError::ParseError("METADATA is missing a Version header".to_string())
    })?;

    Ok(PackageMetadata {
        version,
        requires_python,
        requires_dist,
    })
}

/// Subset of the JSON API's `info` object this crate cares about.
#[derive(Debug, Clone, serde::Deserialize)]
struct JsonInfo {
    name: String,
    version: String,
    #[serde(default)]
    requires_dist: Option<Vec<String>>,
}

/// Subset of the JSON API's top-level response this crate cares about.
#[derive(Debug, Clone, serde::Deserialize)]
struct JsonResponse {
    info: Option<JsonInfo>,
    #[serde(default)]
    releases: HashMap<String, serde_json::Value>,
}

/// Result of parsing `{json_api_url}/{name}/json`: the current release's
/// metadata plus every other version known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPackageInfo {
    /// Normalized package name as reported by PyPI.
    pub name: String,
    /// Metadata for the version this response describes.
    pub metadata: PackageMetadata,
    /// Every version string listed under `releases`, including ones with no files.
    pub all_versions: Vec<String>,
}

/// Parses a JSON API response body, extracting only the fields this crate uses.
pub fn parse_json_api_response(body: &[u8]) -> Result<JsonPackageInfo, PyPIError> {
    let response: JsonResponse = serde_json::from_slice(body)
        .map_err(|e| PyPIError::ParseError(format!("invalid JSON API body: {e}")))?;
    let info = response
        .info
        .ok_or_else(|| PyPIError::ParseError("JSON API body is missing 'info'".to_string()))?;
    let mut all_versions: Vec<String> = response.releases.into_keys().collect();
    all_versions.sort();
    Ok(JsonPackageInfo {
        name: info.name,
        metadata: PackageMetadata {
            version: info.version,
            requires_python: None,
            requires_dist: info.requires_dist.unwrap_or_default(),
        },
        all_versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_version_parses_simple_name() {
        assert_eq!(
            parse_wheel_version("requests-2.31.0-py3-none-any.whl"),
            Some("2.31.0")
        );
    }

    #[test]
    fn wheel_version_parses_hyphenated_distribution_name() {
        assert_eq!(
            parse_wheel_version("scikit-learn-1.3.0-cp311-cp311-manylinux1_x86_64.whl"),
            Some("1.3.0")
        );
    }

    #[test]
    fn wheel_version_handles_local_version_segments() {
        assert_eq!(
            parse_wheel_version("torch-2.1.0+cpu-cp311-none-any.whl"),
            Some("2.1.0+cpu")
        );
    }

    #[test]
    fn universal_wheel_scores_higher_than_platform_specific() {
        let universal = score("foo-1.0-py3-none-any.whl", false);
        let platform = score("foo-1.0-cp311-cp311-manylinux1_x86_64.whl", false);
        assert!(universal > platform);
    }

    #[test]
    fn metadata_available_dominates_universal_tag() {
        let with_metadata = score("foo-1.0-cp311-cp311-manylinux1_x86_64.whl", true);
        let universal_without = score("foo-1.0-py3-none-any.whl", false);
        assert!(with_metadata > universal_without);
    }

    #[test]
    fn metadata_text_parses_multivalued_requires_dist() {
        let text = "Metadata-Version: 2.1\nName: foo\nVersion: 1.0.0\nRequires-Dist: bar>=1.0\nRequires-Dist: baz\n\nA long description.\n";
        let metadata = parse_metadata_text(text).unwrap();
        assert_eq!(metadata.version, "1.0.0");
        assert_eq!(metadata.requires_dist, vec!["bar>=1.0", "baz"]);
    }

    #[test]
    fn metadata_text_stops_at_first_blank_line() {
        let text = "Version: 1.0.0\n\nRequires-Dist: should-be-ignored\n";
        let metadata = parse_metadata_text(text).unwrap();
        assert!(metadata.requires_dist.is_empty());
    }

    #[test]
    fn metadata_text_without_version_is_a_parse_error() {
        let text = "Name: foo\n\n";
        assert!(matches!(
            parse_metadata_text(text),
            Err(PyPIError::ParseError(_))
        ));
    }

    #[test]
    fn simple_api_page_extracts_wheel_anchors_and_pep658_flag() {
        let base = Url::parse("https://pypi.org/simple/foo/").unwrap();
        let body = r#"<html><body>
            <a href="foo-1.0.0-py3-none-any.whl" data-dist-info-metadata="true">foo-1.0.0-py3-none-any.whl</a>
            <a href="foo-1.0.0.tar.gz">foo-1.0.0.tar.gz</a>
        </body></html>"#;
        let files = parse_simple_api_page(&base, body).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].version, "1.0.0");
        assert!(files[0].metadata_available);
    }

    #[test]
    fn json_api_response_extracts_info_and_release_versions() {
        let body = br#"{
            "info": {"name": "foo", "version": "1.0.0", "requires_dist": ["bar>=1.0"]},
            "releases": {"1.0.0": [], "0.9.0": []}
        }"#;
        let parsed = parse_json_api_response(body).unwrap();
        assert_eq!(parsed.name, "foo");
        assert_eq!(parsed.metadata.requires_dist, vec!["bar>=1.0"]);
        assert_eq!(parsed.all_versions, vec!["0.9.0", "1.0.0"]);
    }

    #[test]
    fn json_api_response_missing_info_is_a_parse_error() {
        let body = br#"{"releases": {}}"#;
        assert!(matches!(
            parse_json_api_response(body),
            Err(PyPIError::ParseError(_))
        ));
    }
}
