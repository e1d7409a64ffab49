use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

pub const DEFAULT_DATA_DIR: &str = "json_files";
pub const DEFAULT_OUT_DIR: &str = "visualization_outputs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub cwd: PathBuf,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
}

/// Resolves the input and output directories against `cwd`.
///
/// Overrides may be absolute, relative, or start with `~`; the home directory
/// is only required when an override actually uses `~`.
pub fn resolve_runtime_paths(
    home_dir: Option<&Path>,
    cwd: &Path,
    data_dir_override: Option<&Path>,
    out_dir_override: Option<&Path>,
) -> Result<RuntimePaths> {
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }
    if let Some(home_dir) = home_dir
        && !home_dir.is_absolute()
    {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }

    let cwd = normalize_lexical(cwd);
    let home_dir = home_dir.map(normalize_lexical);
    let data_dir = resolve_user_path(
        data_dir_override.unwrap_or(Path::new(DEFAULT_DATA_DIR)),
        home_dir.as_deref(),
        &cwd,
    )?;
    let out_dir = resolve_user_path(
        out_dir_override.unwrap_or(Path::new(DEFAULT_OUT_DIR)),
        home_dir.as_deref(),
        &cwd,
    )?;

    Ok(RuntimePaths {
        cwd,
        data_dir,
        out_dir,
    })
}

fn resolve_user_path(path: &Path, home_dir: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let Some(home_dir) = home_dir else {
                bail!(
                    "cannot expand `~` without a home directory; pass --home-dir: {}",
                    path.display()
                );
            };
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
