use std::env;
use std::path::{Path, PathBuf};

/// Shell whose startup file carries the managed blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Zsh,
    Bash,
    Fish,
}

impl Shell {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = Path::new(name)
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match name.as_str() {
            "zsh" => Some(Shell::Zsh),
            "bash" => Some(Shell::Bash),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    /// Shell from `$SHELL`, defaulting to bash.
    pub fn detect() -> Self {
        env::var("SHELL")
            .ok()
            .and_then(|shell| Self::from_name(&shell))
            .unwrap_or(Shell::Bash)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::Zsh => "zsh",
            Shell::Bash => "bash",
            Shell::Fish => "fish",
        }
    }

    /// Interactive startup file for this shell under `home`
    pub fn rc_file(self, home: &Path) -> PathBuf {
        match self {
            Shell::Zsh => home.join(".zshrc"),
            Shell::Bash => home.join(".bashrc"),
            Shell::Fish => home.join(".config/fish/config.fish"),
        }
    }

    /// Command that loads `script` into the running shell
    pub fn source_line(self, script: &Path) -> String {
        match self {
            Shell::Zsh | Shell::Bash => format!("source \"{}\"", script.display()),
            Shell::Fish => format!("source '{}'", script.display()),
        }
    }

    /// Line that prepends `bin_dir` to `PATH`
    pub fn path_export(self, bin_dir: &Path) -> String {
        match self {
            Shell::Zsh | Shell::Bash => format!("export PATH=\"{}:$PATH\"", bin_dir.display()),
            Shell::Fish => format!("fish_add_path --prepend '{}'", bin_dir.display()),
        }
    }
}
