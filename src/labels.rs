//! Class index ↔ category name mapping.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::classifier::ClassIndex;
use crate::error::{ArtifactLoadError, DecodeError};

pub trait LabelDecoder: Send + Sync {
    fn decode(&self, index: ClassIndex) -> Result<&str, DecodeError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the ordered label list is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    /// JSON array of strings.
    #[default]
    Json,
    /// One label per non-blank line.
    Lines,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_labels_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: LabelFormat,
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("artifacts/label_encoder.json")
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            path: default_labels_path(),
            format: LabelFormat::default(),
        }
    }
}

/// Ordered category labels; a label's position is its class index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCodec {
    labels: Vec<String>,
}

impl LabelCodec {
    pub fn new(labels: Vec<String>) -> Result<Self, String> {
        if labels.is_empty() {
            return Err("label set is empty".to_string());
        }
        let mut seen = HashSet::with_capacity(labels.len());
        if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(format!("duplicate label `{dup}`"));
        }
        Ok(Self { labels })
    }

    pub fn load(path: &Path, format: LabelFormat) -> Result<Self, ArtifactLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let labels = match format {
            LabelFormat::Json => {
                serde_json::from_str::<Vec<String>>(&raw).map_err(|source| ArtifactLoadError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            LabelFormat::Lines => raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        };

        let codec = Self::new(labels).map_err(|reason| ArtifactLoadError::invalid(path, reason))?;
        tracing::debug!(path = %path.display(), labels = codec.len(), "loaded label codec");
        Ok(codec)
    }

    pub fn encode(&self, label: &str) -> Option<ClassIndex> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| ClassIndex(idx as i64))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl LabelDecoder for LabelCodec {
    fn decode(&self, index: ClassIndex) -> Result<&str, DecodeError> {
        usize::try_from(index.0)
            .ok()
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
            .ok_or(DecodeError {
                index,
                len: self.labels.len(),
            })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

pub fn build_label_decoder(cfg: &LabelsConfig) -> Result<Arc<dyn LabelDecoder>, ArtifactLoadError> {
    let codec = LabelCodec::load(&cfg.path, cfg.format)?;
    Ok(Arc::new(codec) as Arc<dyn LabelDecoder>)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> LabelCodec {
        LabelCodec::new(
            ["Insufficient_Weight", "Normal_Weight", "Obesity_Type_I"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_in_range() {
        let c = codec();
        assert_eq!(c.decode(ClassIndex(0)).unwrap(), "Insufficient_Weight");
        assert_eq!(c.decode(ClassIndex(2)).unwrap(), "Obesity_Type_I");
    }

    #[test]
    fn test_decode_out_of_range() {
        let c = codec();
        assert_eq!(
            c.decode(ClassIndex(3)).unwrap_err(),
            DecodeError {
                index: ClassIndex(3),
                len: 3
            }
        );
        assert!(c.decode(ClassIndex(-1)).is_err());
        assert!(c.decode(ClassIndex(i64::MAX)).is_err());
    }

    #[test]
    fn test_encode_inverts_decode() {
        let c = codec();
        for label in c.labels() {
            let idx = c.encode(label).unwrap();
            assert_eq!(c.decode(idx).unwrap(), label.as_str());
        }
        assert_eq!(c.encode("Overweight_Level_I"), None);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(LabelCodec::new(vec![]).is_err());
        let err = LabelCodec::new(vec!["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert!(err.contains("duplicate label `a`"));
    }

    #[test]
    fn test_shipped_labels() {
        let labels: Vec<String> =
            serde_json::from_str(include_str!("../artifacts/label_encoder.json")).unwrap();
        let c = LabelCodec::new(labels).unwrap();
        assert_eq!(c.len(), 7);
        assert_eq!(c.decode(ClassIndex(1)).unwrap(), "Normal_Weight");
    }

    #[test]
    fn test_load_formats() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("labels.json");
        std::fs::write(&json, r#"["Normal_Weight", "Obesity_Type_I"]"#).unwrap();
        let c = LabelCodec::load(&json, LabelFormat::Json).unwrap();
        assert_eq!(c.labels(), ["Normal_Weight", "Obesity_Type_I"]);

        let lines = dir.path().join("labels.txt");
        std::fs::write(&lines, "Normal_Weight\n\n  Obesity_Type_I \n").unwrap();
        let c = LabelCodec::load(&lines, LabelFormat::Lines).unwrap();
        assert_eq!(c.labels(), ["Normal_Weight", "Obesity_Type_I"]);
    }

    #[test]
    fn test_load_failures() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            LabelCodec::load(&missing, LabelFormat::Json),
            Err(ArtifactLoadError::Io { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"not\": \"a list\"}").unwrap();
        assert!(matches!(
            LabelCodec::load(&bad, LabelFormat::Json),
            Err(ArtifactLoadError::Parse { .. })
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n\n").unwrap();
        assert!(matches!(
            LabelCodec::load(&empty, LabelFormat::Lines),
            Err(ArtifactLoadError::Invalid { .. })
        ));
    }
}
