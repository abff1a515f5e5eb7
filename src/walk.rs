//! Walk documents
//!
//! A walk is a TOML file listing steps; each step points at a fragment of a
//! source file with a `file:address` reference. Loading a walk resolves
//! every reference. A step that fails records its own error and the rest of
//! the walk still loads.

use crate::address::resolve;
use crate::error_helpers;
use crate::lines::{byte_to_line, expand_to_lines};
use crate::range::ByteRange;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Walk document as written on disk
#[derive(Debug, Deserialize)]
struct WalkDocument {
    title: String,
    #[serde(default, rename = "step")]
    steps: Vec<StepDocument>,
}

#[derive(Debug, Deserialize)]
struct StepDocument {
    src: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

/// A loaded walk with every step resolved
#[derive(Debug, Clone, Serialize)]
pub struct Walk {
    pub title: String,
    pub steps: Vec<Step>,
}

/// One step of a walk
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Reference as written, `file` or `file:address`
    pub src: String,
    pub title: String,
    pub body: String,
    /// File part of `src`
    pub file: String,
    /// Resolved lines; `None` for whole-file steps and failures
    pub location: Option<StepLocation>,
    /// Why the step could not be resolved
    pub error: Option<String>,
}

/// Whole-line location of a resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepLocation {
    pub lo_line: usize,
    pub hi_line: usize,
    pub lo_byte: usize,
    pub hi_byte: usize,
}

impl StepLocation {
    /// Expand `range` to whole lines and number them
    pub fn from_range(buf: &[u8], range: ByteRange) -> Self {
        let expanded = expand_to_lines(buf, range);
        let lo_line = byte_to_line(buf, expanded.lo);
        let hi_line = byte_to_line(buf, expanded.hi.saturating_sub(1)).max(lo_line);
        Self {
            lo_line,
            hi_line,
            lo_byte: expanded.lo,
            hi_byte: expanded.hi,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(loc) = &self.location {
            write!(f, ":{}", loc.lo_line)?;
            if loc.lo_line != loc.hi_line {
                write!(f, ",{}", loc.hi_line)?;
            }
        }
        Ok(())
    }
}

impl Walk {
    /// Read and resolve the walk at `path`; step files are relative to `root`
    pub fn load(path: &Path, root: &Path) -> Result<Walk> {
        let text = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(error_helpers::read_error(path, &e, "loading walk"))
        })?;
        Self::parse(&text, root).with_context(|| format!("Failed to load walk: {}", path.display()))
    }

    /// Parse walk TOML and resolve every step against files under `root`
    pub fn parse(text: &str, root: &Path) -> Result<Walk> {
        let document: WalkDocument = toml::from_str(text).context("Invalid walk document")?;
        debug!(title = %document.title, steps = document.steps.len(), "parsed walk");

        let mut buffers = SourceCache::new(root);
        let steps = document
            .steps
            .into_iter()
            .map(|step| resolve_step(step, &mut buffers))
            .collect();

        Ok(Walk {
            title: document.title,
            steps,
        })
    }

    /// Sorted files referenced by steps that resolved
    pub fn files(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.error.is_none())
            .map(|s| s.file.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}

fn resolve_step(doc: StepDocument, buffers: &mut SourceCache<'_>) -> Step {
    let (file, address) = match doc.src.split_once(':') {
        Some((file, address)) => (file.to_string(), Some(address.to_string())),
        None => (doc.src.clone(), None),
    };

    let outcome = buffers.read(&file).and_then(|buf| match &address {
        Some(address) => {
            let range = resolve(address, buf, ByteRange::default())
                .with_context(|| format!("{}:{}", file, address))?;
            Ok(Some(StepLocation::from_range(buf, range)))
        }
        None => Ok(None),
    });

    let (location, error) = match outcome {
        Ok(location) => (location, None),
        Err(e) => {
            let message = format!("{:#}", e);
            warn!(src = %doc.src, error = %message, "step failed to resolve");
            (None, Some(message))
        }
    };

    Step {
        src: doc.src,
        title: doc.title,
        body: doc.body,
        file,
        location,
        error,
    }
}

/// Step files read so far, each loaded once per walk
struct SourceCache<'a> {
    root: &'a Path,
    buffers: HashMap<String, Vec<u8>>,
}

impl<'a> SourceCache<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            buffers: HashMap::new(),
        }
    }

    fn read(&mut self, file: &str) -> Result<&[u8]> {
        if !self.buffers.contains_key(file) {
            let path = self.resolve_path(file)?;
            let data = fs::read(&path).map_err(|e| {
                anyhow::anyhow!(error_helpers::read_error(&path, &e, "reading step source"))
            })?;
            self.buffers.insert(file.to_string(), data);
        }
        Ok(self.buffers[file].as_slice())
    }

    /// Join `file` onto the root, refusing paths that leave it
    fn resolve_path(&self, file: &str) -> Result<PathBuf> {
        let relative = Path::new(file);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.is_empty() || escapes {
            anyhow::bail!("Step file must be a relative path inside the walk root: '{}'", file);
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/main.rs"),
            "use std::io;\n\nfn main() {\n    run();\n}\n\nfn run() {}\n",
        )
        .unwrap();
        fs::write(dir.path().join("README"), "hello\n").unwrap();
        dir
    }

    #[test]
    fn test_parse_resolves_steps() {
        let dir = setup();
        let text = r#"
title = "Tour"

[[step]]
src = "src/main.rs:/fn main/,/(?m)^}/"
title = "Main"
body = "Entry point."

[[step]]
src = "src/main.rs:7"
title = "Run"

[[step]]
src = "README"
"#;
        let walk = Walk::parse(text, dir.path()).unwrap();
        assert_eq!(walk.title, "Tour");
        assert_eq!(walk.steps.len(), 3);

        let main = &walk.steps[0];
        assert!(main.error.is_none(), "unexpected error: {:?}", main.error);
        assert_eq!(main.location.map(|l| (l.lo_line, l.hi_line)), Some((3, 5)));
        assert_eq!(main.to_string(), "src/main.rs:3,5");
        assert_eq!(main.body, "Entry point.");

        assert_eq!(walk.steps[1].to_string(), "src/main.rs:7");
        assert_eq!(walk.steps[2].to_string(), "README");
        assert!(walk.steps[2].location.is_none());

        assert_eq!(walk.files(), vec!["README", "src/main.rs"]);
    }

    #[test]
    fn test_failing_step_does_not_stop_siblings() {
        let dir = setup();
        let text = r#"
title = "Broken"

[[step]]
src = "src/main.rs:/does not exist/"

[[step]]
src = "missing.rs:1"

[[step]]
src = "src/main.rs:-/main/"

[[step]]
src = "src/main.rs:1"
"#;
        let walk = Walk::parse(text, dir.path()).unwrap();
        assert_eq!(walk.failed_steps().count(), 3);

        let no_match = walk.steps[0].error.as_deref().unwrap();
        assert!(no_match.contains("no match for /does not exist/"), "{}", no_match);
        assert!(walk.steps[1].error.as_deref().unwrap().contains("File not found"));
        assert!(walk.steps[2].error.as_deref().unwrap().contains("reverse search"));

        assert!(walk.steps[3].error.is_none());
        assert_eq!(walk.files(), vec!["src/main.rs"]);
    }

    #[test]
    fn test_step_paths_must_stay_inside_root() {
        let dir = setup();
        let text = r#"
title = "Escape"

[[step]]
src = "../secret:1"

[[step]]
src = "/etc/passwd:1"
"#;
        let walk = Walk::parse(text, dir.path()).unwrap();
        assert_eq!(walk.failed_steps().count(), 2);
        assert!(walk.steps[0].error.as_deref().unwrap().contains("inside the walk root"));
    }

    #[test]
    fn test_invalid_document() {
        let dir = setup();
        assert!(Walk::parse("title = ", dir.path()).is_err());
        assert!(Walk::parse("[[step]]\nsrc = \"a\"\n", dir.path()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = setup();
        let walk_path = dir.path().join("tour.toml");
        fs::write(&walk_path, "title = \"Empty\"\n").unwrap();
        let walk = Walk::load(&walk_path, dir.path()).unwrap();
        assert_eq!(walk.title, "Empty");
        assert!(walk.steps.is_empty());

        let err = Walk::load(&dir.path().join("nope.toml"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_step_location_from_empty_range() {
        let buf = b"a\nb\nc\n";
        // Empty range at a line start stays on that line
        let loc = StepLocation::from_range(buf, ByteRange::at(2));
        assert_eq!((loc.lo_line, loc.hi_line), (2, 2));
        let loc = StepLocation::from_range(buf, ByteRange::new(1, 3));
        assert_eq!((loc.lo_line, loc.hi_line), (1, 2));
    }
}
