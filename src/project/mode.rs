use log::warn;

/// Run semantics derived once from the project mode string.
///
/// An immutable value object: the initializer may replace the whole set when
/// it upgrades or downgrades a run, but flags are never recomputed piecemeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    /// Read an existing project file
    pub read_project: bool,

    /// Write the project file
    pub write_project: bool,

    /// Keep the project file updated during the run (write and not reparse)
    pub update_project: bool,

    /// Load content from the source subtitle file
    pub load_subtitles: bool,

    /// Preview run: no translation output expected
    pub preview: bool,

    /// Resume a previous run from the project file
    pub resume: bool,

    /// Reparse existing translations without updating mid-run
    pub reparse: bool,

    /// Retranslate everything from the project file
    pub retranslate: bool,
}

impl ModeFlags {
    /// Derive the flag set for a mode string, case-insensitively.
    ///
    /// The empty string is the canonical "no mode" case and requests a plain
    /// source load. Unrecognized strings resolve to all-false and are logged;
    /// the initializer treats them as "no explicit mode" rather than failing.
    pub fn resolve(mode: &str) -> Self {
        let mode = mode.trim().to_lowercase();

        let read_project = matches!(
            mode.as_str(),
            "true" | "read" | "resume" | "retranslate" | "reparse"
        );
        let write_project = matches!(
            mode.as_str(),
            "true" | "write" | "preview" | "resume" | "retranslate" | "reparse"
        );
        let load_subtitles = matches!(mode.as_str(), "" | "true" | "write" | "reload");

        let known = read_project || write_project || load_subtitles;
        if !known {
            warn!("Unrecognized project mode '{}', treating as no mode", mode);
        }

        Self {
            read_project,
            write_project,
            update_project: write_project && mode != "reparse",
            load_subtitles,
            preview: mode == "preview",
            resume: mode == "resume",
            reparse: mode == "reparse",
            retranslate: mode == "retranslate",
        }
    }
}
