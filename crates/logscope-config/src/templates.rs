//! Starter files written by `logscope init`.
//!
//! The sources under `templates/` are live TOML with example values. They are
//! rendered with every setting commented out, so a fresh file changes nothing
//! until the user uncomments a line.

/// Which starter file to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// `.logscope.toml` next to a log project.
    Project,
    /// `~/.logscope.toml`.
    Global,
}

impl Template {
    /// Picks the global template when writing to the home directory.
    pub fn for_location(global: bool) -> Self {
        if global { Self::Global } else { Self::Project }
    }

    /// Example values as live TOML.
    fn source(self) -> &'static str {
        match self {
            Self::Project => include_str!("../templates/config.toml"),
            Self::Global => include_str!("../templates/config-global.toml"),
        }
    }

    /// Returns the file contents with settings and section headers commented out.
    pub fn render(self) -> String {
        self.source()
            .lines()
            .map(|line| {
                if line.is_empty() || line.starts_with('#') {
                    line.to_string()
                } else {
                    format!("# {line}")
                }
            })
            .fold(String::new(), |mut out, line| {
                out.push_str(&line);
                out.push('\n');
                out
            })
    }
}
