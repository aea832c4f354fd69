//! Font loading utilities for the `prompt_guide` crate.
//!
//! The guide needs two families: a proportional one for running text and a monospace one for
//! the prompt blocks. Both are looked up by file name in a list of candidate directories, see
//! [`font_directory_candidates`].

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Environment variable that takes precedence over every other font directory.
pub const FONTS_DIR_ENV: &str = "PROMPT_GUIDE_FONTS_DIR";

/// Environment variable pointing at a directory holding the Windows fallback fonts.
pub const WINDOWS_FONTS_DIR_ENV: &str = "PROMPT_GUIDE_WINDOWS_FONTS_DIR";

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation-mono",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
];

/// A font family the guide depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideFamily {
    /// Proportional family used for titles, body text and boxes.
    Sans,
    /// Monospace family used for the prompt blocks.
    Mono,
}

struct WindowsFontFiles {
    family: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl GuideFamily {
    /// Family name as used in the file names (`<name>-Regular.ttf`, ...).
    pub fn name(self) -> &'static str {
        match self {
            GuideFamily::Sans => "LiberationSans",
            GuideFamily::Mono => "LiberationMono",
        }
    }

    /// File names expected on disk for this family.
    pub fn file_names(self) -> [String; 4] {
        let name = self.name();
        [
            format!("{name}-Regular.ttf"),
            format!("{name}-Bold.ttf"),
            format!("{name}-Italic.ttf"),
            format!("{name}-BoldItalic.ttf"),
        ]
    }

    fn windows_files(self) -> WindowsFontFiles {
        match self {
            GuideFamily::Sans => WindowsFontFiles {
                family: "Arial",
                regular: "arial.ttf",
                bold: "arialbd.ttf",
                italic: "ariali.ttf",
                bold_italic: "arialbi.ttf",
            },
            GuideFamily::Mono => WindowsFontFiles {
                family: "Courier New",
                regular: "cour.ttf",
                bold: "courbd.ttf",
                italic: "couri.ttf",
                bold_italic: "courbi.ttf",
            },
        }
    }
}

/// Both families required to render the guide.
pub struct GuideFonts {
    pub sans: FontFamily<FontData>,
    pub mono: FontFamily<FontData>,
}

/// Directory shipped next to the crate manifest.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

/// Returns the ordered list of directories searched for font files.
pub fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.iter().any(|existing| existing == &candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(bundled_fonts_source_dir());

    for dir in SYSTEM_FONT_DIRS {
        push(PathBuf::from(dir));
    }

    candidates
}

fn missing_font_files(path: &Path, family: GuideFamily) -> Vec<String> {
    family
        .file_names()
        .into_iter()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

/// Finds the first candidate directory holding all four files of `family`.
pub fn resolve_font_directory(family: GuideFamily) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate, family);
        if missing.is_empty() {
            debug!("Using {} fonts from {}", family.name(), candidate.display());
            return Ok(candidate);
        }

        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font family. Checked: {}. See assets/fonts/README.md or set {}.",
            family.name(),
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_family(family: GuideFamily) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(family)?;

    fonts::from_files(&directory, family.name(), None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                family.name(),
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn load_windows_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load Windows fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn windows_fallback_family(family: GuideFamily) -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    let files = family.windows_files();
    Ok(FontFamily {
        regular: load_windows_font(&directory, files.regular, "regular")?,
        bold: load_windows_font(&directory, files.bold, "bold")?,
        italic: load_windows_font(&directory, files.italic, "italic")?,
        bold_italic: load_windows_font(&directory, files.bold_italic, "bold italic")?,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads `family`, falling back to the matching Windows family when the Liberation files are
/// missing.
pub fn font_family(family: GuideFamily) -> Result<FontFamily<FontData>, Error> {
    match load_family(family) {
        Ok(loaded) => Ok(loaded),
        Err(err) if fonts_missing(&err) => match windows_fallback_family(family) {
            Ok(fallback) => {
                warn!(
                    "{} fonts unavailable ({}); falling back to Windows '{}' family.",
                    family.name(),
                    err,
                    family.windows_files().family
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "{} fonts unavailable ({}); Windows fallback failed: {}",
                    family.name(),
                    err,
                    fallback_err
                );
                Err(Error::new(
                    format!(
                        "{} fonts unavailable and Windows fallback failed: {}",
                        family.name(),
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "guide fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Loads both families needed by the guide.
pub fn guide_fonts() -> Result<GuideFonts, Error> {
    Ok(GuideFonts {
        sans: font_family(GuideFamily::Sans)?,
        mono: font_family(GuideFamily::Mono)?,
    })
}

/// Indicates whether both Liberation families can be found on disk.
pub fn guide_fonts_available() -> bool {
    resolve_font_directory(GuideFamily::Sans).is_ok()
        && resolve_font_directory(GuideFamily::Mono).is_ok()
}

/// Human-readable summary of where each family resolves, one line per family.
pub fn font_report() -> Vec<String> {
    [GuideFamily::Sans, GuideFamily::Mono]
        .into_iter()
        .map(|family| match resolve_font_directory(family) {
            Ok(dir) => format!("{}: {}", family.name(), dir.display()),
            Err(err) => format!("{}: {}", family.name(), err),
        })
        .collect()
}
