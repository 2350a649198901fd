use std::path::{Component, Path, PathBuf};

/// Renders `path` relative to the current working directory.
pub fn display_path(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => display_path_from(&cwd, path),
        Err(_) => normalize_separators(path),
    }
}

pub fn display_path_from(base: &Path, path: &Path) -> String {
    normalize_separators(&relative_to(base, path))
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        return path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
    }
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

fn normalize_separators(path: &Path) -> String {
    let s = path.to_string_lossy();
    let s = if cfg!(windows) {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    } else {
        s.into_owned()
    };
    if s.is_empty() { ".".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_working_directory_prefix() {
        let base = Path::new("/work/project");
        assert_eq!(
            display_path_from(base, Path::new("/work/project/src/Foo.php")),
            "src/Foo.php"
        );
    }

    #[test]
    fn walks_up_for_paths_outside_base() {
        let base = Path::new("/work/project");
        assert_eq!(
            display_path_from(base, Path::new("/work/other/Bar.php")),
            "../other/Bar.php"
        );
    }

    #[test]
    fn relative_input_drops_current_dir_segments() {
        let base = Path::new("/work/project");
        assert_eq!(
            display_path_from(base, Path::new("./src/./Foo.php")),
            "src/Foo.php"
        );
    }

    #[test]
    fn base_itself_renders_as_dot() {
        let base = Path::new("/work/project");
        assert_eq!(display_path_from(base, Path::new("/work/project")), ".");
    }

    #[cfg(unix)]
    #[test]
    fn backslash_in_unix_file_name_is_kept() {
        let base = Path::new("/work/project");
        assert_eq!(
            display_path_from(base, Path::new("/work/project/odd\\name.php")),
            "odd\\name.php"
        );
    }
}
