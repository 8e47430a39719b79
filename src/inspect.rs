//! Offline diagnostics for artifact files.
//!
//! Exit codes: 0 success, 1 missing file, 2 deserialization error.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::artifact::{ModelArtifact, Regressor, ScalerArtifact, Transformer};
use crate::artifact_loader::{fingerprint, ArtifactDocument};
use crate::errors::{EstimatorError, EstimatorResult};
use crate::feature_schema::discover_schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutcome {
    Ok,
    Missing,
    Undecodable,
}

impl InspectOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            InspectOutcome::Ok => 0,
            InspectOutcome::Missing => 1,
            InspectOutcome::Undecodable => 2,
        }
    }

    /// The worse of two outcomes, for summarizing a directory
    fn worst(self, other: Self) -> Self {
        if other.exit_code() > self.exit_code() {
            other
        } else {
            self
        }
    }
}

enum Decoded {
    Model(ModelArtifact),
    Scaler(ScalerArtifact),
}

fn decode<T: ArtifactDocument>(bytes: &[u8]) -> EstimatorResult<T> {
    let artifact: T = serde_json::from_slice(bytes)
        .map_err(|e| EstimatorError::serialization(format!("decode {}", T::LABEL), e))?;
    artifact.validate()?;
    Ok(artifact)
}

fn describe_names(out: &mut dyn Write, indent: &str, names: Option<&[String]>, width: Option<usize>) -> io::Result<()> {
    match width {
        Some(n) => writeln!(out, "{indent}n_features_in_: {n}")?,
        None => writeln!(out, "{indent}n_features_in_: None")?,
    }
    match names {
        Some(names) => writeln!(out, "{indent}feature_names_in_: {names:?}"),
        None => writeln!(out, "{indent}feature_names_in_: None"),
    }
}

fn describe_model(out: &mut dyn Write, model: &ModelArtifact) -> io::Result<()> {
    writeln!(out, "  type: {}", model.kind())?;
    describe_names(out, "  ", model.feature_names_in(), model.n_features_in())?;
    if let Some(best) = model.best_estimator() {
        writeln!(out, "  is search wrapper, best_estimator_ type: {}", best.kind())?;
        describe_names(out, "    best_estimator_.", best.feature_names_in(), best.n_features_in())?;
    }
    match discover_schema(model) {
        Ok(schema) => writeln!(out, "  schema ({}): {} columns", schema.source, schema.len()),
        Err(e) => writeln!(out, "  schema: {e}"),
    }
}

fn describe_scaler(out: &mut dyn Write, scaler: &ScalerArtifact) -> io::Result<()> {
    writeln!(out, "  type: {}", scaler.kind())?;
    describe_names(out, "  ", scaler.feature_names_in(), scaler.n_features_in())
}

/// Report on one artifact file
pub fn inspect_file(path: &Path, out: &mut dyn Write) -> io::Result<InspectOutcome> {
    writeln!(out, "--- {}", path.display())?;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            writeln!(out, "  Could not read: {e}")?;
            return Ok(InspectOutcome::Missing);
        }
    };

    let decoded = match decode::<ModelArtifact>(&bytes) {
        Ok(model) => Ok(Decoded::Model(model)),
        Err(model_err) => decode::<ScalerArtifact>(&bytes)
            .map(Decoded::Scaler)
            .map_err(|scaler_err| (model_err, scaler_err)),
    };

    match decoded {
        Ok(Decoded::Model(model)) => describe_model(out, &model)?,
        Ok(Decoded::Scaler(scaler)) => describe_scaler(out, &scaler)?,
        Err((model_err, scaler_err)) => {
            writeln!(out, "  Could not deserialize as model: {model_err}")?;
            writeln!(out, "  Could not deserialize as scaler: {scaler_err}")?;
            return Ok(InspectOutcome::Undecodable);
        }
    }
    writeln!(out, "  sha256: {}", fingerprint(&bytes))?;
    Ok(InspectOutcome::Ok)
}

/// Report on every `.json` file in a directory
pub fn inspect_dir(dir: &Path, out: &mut dyn Write) -> io::Result<InspectOutcome> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            writeln!(out, "Could not list {}: {e}", dir.display())?;
            return Ok(InspectOutcome::Missing);
        }
    };

    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    writeln!(out, "Directory: {}", dir.display())?;
    if files.is_empty() {
        writeln!(out, "No artifact files found.")?;
        return Ok(InspectOutcome::Ok);
    }

    let mut outcome = InspectOutcome::Ok;
    for file in &files {
        outcome = outcome.worst(inspect_file(file, out)?);
    }
    writeln!(out, "Done.")?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(path: &Path, dir: bool) -> (InspectOutcome, String) {
        let mut buf = Vec::new();
        let outcome = if dir {
            inspect_dir(path, &mut buf).unwrap()
        } else {
            inspect_file(path, &mut buf).unwrap()
        };
        (outcome, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn missing_file_exits_with_one() {
        let dir = TempDir::new().unwrap();
        let (outcome, _) = run(&dir.path().join("model.json"), false);
        assert_eq!(outcome, InspectOutcome::Missing);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn garbage_exits_with_two() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "not an artifact").unwrap();
        let (outcome, text) = run(&path, false);
        assert_eq!(outcome.exit_code(), 2);
        assert!(text.contains("Could not deserialize"));
    }

    #[test]
    fn search_wrapper_reports_nested_attributes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(
            &path,
            r#"{"kind":"search_cv","best_estimator_":{"kind":"linear_regression","coef_":[1.0],"feature_names_in_":["Area"]}}"#,
        )
        .unwrap();
        let (outcome, text) = run(&path, false);
        assert_eq!(outcome, InspectOutcome::Ok);
        assert!(text.contains("type: search_cv"));
        assert!(text.contains("best_estimator_.feature_names_in_: [\"Area\"]"));
        assert!(text.contains("schema (nested_estimator): 1 columns"));
        assert!(text.contains("sha256: "));
    }

    #[test]
    fn directory_summary_takes_the_worst_outcome() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("scaler.json"),
            r#"{"kind":"min_max_scaler","min_":[0.0],"scale_":[1.0]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (outcome, text) = run(dir.path(), true);
        assert_eq!(outcome, InspectOutcome::Undecodable);
        assert!(text.contains("type: min_max_scaler"));
        assert!(!text.contains("notes.txt"));
    }

    #[test]
    fn empty_directory_is_fine() {
        let dir = TempDir::new().unwrap();
        let (outcome, text) = run(dir.path(), true);
        assert_eq!(outcome, InspectOutcome::Ok);
        assert!(text.contains("No artifact files found."));
    }
}
