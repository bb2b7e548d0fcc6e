//! Utility functions for path manipulation.

use std::path::PathBuf;

/// Joins a file name to the data directory.
///
/// Non UTF-8 components are replaced rather than rejected, the result is only
/// used to open files and in log messages.
///
/// # Examples
///
/// ```ignore
/// # use meatbot::utils::get_path;
/// let path = get_path("/var/lib/meatbot", "meatball_days.json");
/// assert_eq!(path, "/var/lib/meatbot/meatball_days.json");
/// ```
pub fn get_path(dir_path: &str, file_name: &str) -> String {
    let path_buf: PathBuf = [dir_path, file_name].iter().collect();
    path_buf.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_path_with_file() {
        let path = get_path("/var/data", "meatball_days.json");
        #[cfg(unix)]
        assert_eq!(path, "/var/data/meatball_days.json");
        #[cfg(windows)]
        assert_eq!(path, "\\var\\data\\meatball_days.json");
    }

    #[test]
    fn test_get_path_relative_paths() {
        let path = get_path(".", "data");
        #[cfg(unix)]
        assert_eq!(path, "./data");
        #[cfg(windows)]
        assert_eq!(path, ".\\data");
    }

    #[test]
    fn test_get_path_trailing_separator() {
        let path = get_path("/var/data/", "meatball_days.json");
        #[cfg(unix)]
        assert_eq!(path, "/var/data/meatball_days.json");
    }

    #[test]
    fn test_get_path_with_spaces() {
        let path = get_path("/home/my folder", "my file.json");
        #[cfg(unix)]
        assert_eq!(path, "/home/my folder/my file.json");
        #[cfg(windows)]
        assert_eq!(path, "\\home\\my folder\\my file.json");
    }
}
