use std::path::PathBuf;

use crate::UpdateError;

/// The three validated inputs of an update transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub main_executable: String,
}

impl UpdateRequest {
    /// Parses `<sourceDir> <targetDir> <mainExecutable>`.
    ///
    /// Only the argument shape is checked here; the filesystem is untouched.
    /// `exe_suffix` is normally `std::env::consts::EXE_SUFFIX`.
    pub fn from_args(args: &[String], exe_suffix: &str) -> Result<Self, UpdateError> {
        let [source, target, executable] = args else {
            return Err(invalid_args(args));
        };

        let source_dir = trim_trailing_separators(source);
        let target_dir = trim_trailing_separators(target);
        let main_executable = normalize_executable_name(executable, exe_suffix);
        if source_dir.is_empty() || target_dir.is_empty() || main_executable.is_empty() {
            return Err(invalid_args(args));
        }

        Ok(Self {
            source_dir: PathBuf::from(source_dir),
            target_dir: PathBuf::from(target_dir),
            main_executable,
        })
    }

    pub fn ensure_source_exists(&self) -> Result<(), UpdateError> {
        if self.source_dir.is_dir() {
            return Ok(());
        }
        Err(UpdateError::SourceMissing(self.source_dir.clone()))
    }

    /// Name the running application shows up under in the process table:
    /// the executable name without the platform suffix. Other extensions
    /// are part of the name.
    pub fn process_name(&self, exe_suffix: &str) -> String {
        strip_suffix_ignore_case(&self.main_executable, exe_suffix)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(self.main_executable.as_str())
            .to_string()
    }

    pub fn executable_path(&self) -> PathBuf {
        self.target_dir.join(&self.main_executable)
    }
}

/// Strips trailing `/` and `\`. A path made only of separators keeps its first one.
pub fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        return &path[..1];
    }
    trimmed
}

/// Reduces a name or path to its file name and appends `suffix` when missing.
pub fn normalize_executable_name(name: &str, suffix: &str) -> String {
    let file_name = name
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if file_name.is_empty() || suffix.is_empty() {
        return file_name.to_string();
    }
    if strip_suffix_ignore_case(file_name, suffix).is_some() {
        return file_name.to_string();
    }
    format!("{file_name}{suffix}")
}

/// `name` without a trailing `suffix`, compared ASCII case-insensitively.
/// `None` when `suffix` is empty or absent.
pub fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || name.len() < suffix.len() {
        return None;
    }
    let split = name.len() - suffix.len();
    if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&name[..split])
}

fn invalid_args(args: &[String]) -> UpdateError {
    UpdateError::InvalidArgs {
        values: args.to_vec(),
    }
}
