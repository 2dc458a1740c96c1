// ── Persistence writer ──
//
// One YAML file per (host, vsys, object type). Existing files are never
// replaced unless the run is forced.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::WriteError;
use crate::record::Record;

/// Result of persisting one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file already existed and the run was not forced.
    Skipped,
}

/// The records of one object type for one (host, vsys).
#[derive(Debug, Clone)]
pub struct ConfigUnit {
    pub host: String,
    pub vsys: String,
    /// `{module}_{object_type}`
    pub object_type_path: String,
    pub records: Vec<Record>,
}

impl ConfigUnit {
    pub fn new(
        host: impl Into<String>,
        vsys: impl Into<String>,
        module: &str,
        object_type: &str,
        records: Vec<Record>,
    ) -> Self {
        Self {
            host: host.into(),
            vsys: vsys.into(),
            object_type_path: format!("{module}_{object_type}"),
            records,
        }
    }

    /// `{root}/{host}/{vsys}/{module}_{object_type}.yml`
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(&self.host)
            .join(&self.vsys)
            .join(format!("{}.yml", self.object_type_path))
    }
}

/// Persist `records` at `path`.
///
/// Returns [`WriteOutcome::Skipped`] without touching the file when it
/// already exists and `force` is false.
pub fn write_unit(path: &Path, records: &[Record], force: bool) -> Result<WriteOutcome, WriteError> {
    if path.exists() && !force {
        info!(path = %path.display(), "file exists, skipping (use --force to overwrite)");
        return Ok(WriteOutcome::Skipped);
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let body = render(records)?;
    std::fs::write(path, body).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), records = records.len(), "written");
    Ok(WriteOutcome::Written)
}

/// Render records as a YAML document: `---` header, one blank line
/// between top-level list items.
pub fn render(records: &[Record]) -> Result<String, WriteError> {
    let yaml = serde_yaml::to_string(records)?;

    let mut out = String::with_capacity(yaml.len() + records.len() + 4);
    out.push_str("---\n");
    let mut first = true;
    for line in yaml.lines() {
        if line.starts_with("- ") || line == "-" {
            if !first {
                out.push('\n');
            }
            first = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("name", "dns").with("value", "10.0.0.53"),
            Record::new().with("name", "web").with("value", "10.0.0.80"),
        ]
    }

    #[test]
    fn renders_document_with_blank_line_between_records() {
        assert_eq!(
            render(&records()).unwrap(),
            "---\n- name: dns\n  value: 10.0.0.53\n\n- name: web\n  value: 10.0.0.80\n"
        );
    }

    #[test]
    fn nested_lists_are_not_separated() {
        let mut vr = Record::new().with("name", "default");
        vr.insert_children(
            "static_route",
            vec![
                Record::new().with("name", "a"),
                Record::new().with("name", "b"),
            ],
        );
        let text = render(&[vr]).unwrap();
        assert!(!text.contains("\n\n"), "unexpected blank line in:\n{text}");
    }

    #[test]
    fn unit_path_layout() {
        let unit = ConfigUnit::new("fw01", "vsys2", "objects", "address", Vec::new());
        assert_eq!(
            unit.path(Path::new("/out")),
            PathBuf::from("/out/fw01/vsys2/objects_address.yml")
        );
    }

    #[test]
    fn creates_directories_and_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fw01/vsys1/objects_address.yml");

        assert_eq!(write_unit(&path, &records(), false).unwrap(), WriteOutcome::Written);
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.starts_with("---\n- name: dns"));

        let other = vec![Record::new().with("name", "changed")];
        assert_eq!(write_unit(&path, &other, false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        assert_eq!(write_unit(&path, &other, true).unwrap(), WriteOutcome::Written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "---\n- name: changed\n"
        );
    }
}
