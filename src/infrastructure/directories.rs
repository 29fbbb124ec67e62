use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::{ArtifactConfig, DirectoryConfig};

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub artifacts: ArtifactPaths,
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub label_encoder: PathBuf,
}

pub fn ensure_directories(
    dirs: &DirectoryConfig,
    artifacts: &ArtifactConfig,
) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(&dirs.logs_dir)?;
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let model_dir = resolve_model_dir(&artifacts.model_dir, exe_dir.as_deref());

    Ok(ResolvedPaths {
        logs_dir,
        artifacts: ArtifactPaths {
            model: model_dir.join(&artifacts.model_file),
            tokenizer: model_dir.join(&artifacts.tokenizer_file),
            label_encoder: model_dir.join(&artifacts.label_encoder_file),
        },
    })
}

/// Relative model directories are looked up in the working directory first,
/// then next to the executable.
fn resolve_model_dir(raw: &str, exe_dir: Option<&Path>) -> PathBuf {
    let dir = PathBuf::from(raw);
    if dir.is_absolute() || dir.is_dir() {
        return dir;
    }
    match exe_dir.map(|base| base.join(&dir)) {
        Some(beside_exe) if beside_exe.is_dir() => beside_exe,
        _ => dir,
    }
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_executable_directory() {
        let exe_dir = tempfile::tempdir().unwrap();
        fs::create_dir(exe_dir.path().join("bundled-model-dir")).unwrap();

        let resolved = resolve_model_dir("bundled-model-dir", Some(exe_dir.path()));
        assert_eq!(resolved, exe_dir.path().join("bundled-model-dir"));
    }

    #[test]
    fn keeps_unresolvable_relative_path() {
        let resolved = resolve_model_dir("no-such-model-dir", None);
        assert_eq!(resolved, PathBuf::from("no-such-model-dir"));
    }

    #[test]
    fn absolute_paths_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().to_str().unwrap();
        assert_eq!(resolve_model_dir(raw, None), dir.path());
    }
}
