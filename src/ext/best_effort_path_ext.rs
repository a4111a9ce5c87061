use std::path::{Component, Path, PathBuf};

/// Renders a path for humans: canonical when it still exists, otherwise
/// absolutized against the working directory with `.` and `..` folded away.
///
/// Error messages use this because the paths they mention have often just
/// vanished from disk.
pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl<T: AsRef<Path> + ?Sized> BestEffortPathExt for T {
    fn best_effort_path_display(&self) -> String {
        let path = self.as_ref();
        if let Ok(canonical) = path.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        lexically_normalize(&absolute).display().to_string()
    }
}

fn lexically_normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(Vec::new(), |mut kept: Vec<Component>, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(kept.last(), Some(Component::Normal(_))) {
                        kept.pop();
                    }
                }
                other => kept.push(other),
            }
            kept
        })
        .iter()
        .collect()
}
