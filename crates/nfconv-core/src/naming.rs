//! Filename sanitising and Unicode normalisation.
//!
//! [`transform_name`] is the single naming rule applied to every entry:
//! spaces in the stem become underscores, the stem is lower-cased, the
//! extension is kept as-is, and the whole name is brought into the target
//! [`NormalizationForm`].

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;

/// Target Unicode normalization form for converted names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizationForm {
    /// Canonical composition (NFC). Base letters and combining marks are
    /// merged into precomposed code points.
    #[default]
    #[serde(rename = "nfc", alias = "composed")]
    Composed,
    /// Canonical decomposition (NFD). Precomposed code points are expanded
    /// into a base letter followed by combining marks.
    #[serde(rename = "nfd", alias = "decomposed")]
    Decomposed,
}

impl NormalizationForm {
    /// Returns the other form.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Composed => Self::Decomposed,
            Self::Decomposed => Self::Composed,
        }
    }

    /// Short uppercase label (`NFC` / `NFD`) for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Composed => "NFC",
            Self::Decomposed => "NFD",
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NormalizationForm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nfc" | "composed" => Ok(Self::Composed),
            "nfd" | "decomposed" => Ok(Self::Decomposed),
            _ => Err(CoreError::UnknownForm(s.to_string())),
        }
    }
}

/// Brings `s` into the given normalization form.
pub fn normalize(s: &str, form: NormalizationForm) -> String {
    match form {
        NormalizationForm::Composed => s.nfc().collect(),
        NormalizationForm::Decomposed => s.nfd().collect(),
    }
}

/// Returns `true` if `s` is already in the given normalization form.
pub fn is_normalized(s: &str, form: NormalizationForm) -> bool {
    match form {
        NormalizationForm::Composed => unicode_normalization::is_nfc(s),
        NormalizationForm::Decomposed => unicode_normalization::is_nfd(s),
    }
}

/// Splits a file name into `(stem, extension)` at the last dot.
///
/// The extension keeps its leading dot. Leading dots never start an
/// extension, so `.bashrc` is all stem.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Computes the converted form of a single file or directory name.
///
/// # Examples
///
/// ```
/// use nfconv_core::{transform_name, NormalizationForm};
///
/// let name = transform_name("Café Münster.txt", NormalizationForm::Composed);
/// assert_eq!(name, "caf\u{e9}_m\u{fc}nster.txt");
/// ```
pub fn transform_name(name: &str, form: NormalizationForm) -> String {
    let (stem, ext) = split_name(name);
    let mut sanitized = stem.replace(' ', "_").to_lowercase();
    sanitized.push_str(ext);
    normalize(&sanitized, form)
}

/// Computes the converted form of a raw file name as returned by the OS.
///
/// UTF-8 names go through [`transform_name`]. On Unix, names with bytes
/// that do not decode are converted piecewise: every run of valid text is
/// transformed and the undecodable bytes are kept in place. On other
/// platforms such names come back unchanged.
pub fn transform_os_name(name: &OsStr, form: NormalizationForm) -> OsString {
    match name.to_str() {
        Some(name) => transform_name(name, form).into(),
        None => transform_raw(name, form),
    }
}

#[cfg(unix)]
fn transform_raw(name: &OsStr, form: NormalizationForm) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = name.as_bytes();
    let (stem, ext) = split_bytes(bytes);
    let mut out = Vec::with_capacity(bytes.len());
    utf8_runs(stem, |run| match run {
        Ok(text) => {
            let sanitized = text.replace(' ', "_").to_lowercase();
            out.extend_from_slice(normalize(&sanitized, form).as_bytes());
        }
        Err(raw) => out.extend_from_slice(raw),
    });
    utf8_runs(ext, |run| match run {
        Ok(text) => out.extend_from_slice(normalize(text, form).as_bytes()),
        Err(raw) => out.extend_from_slice(raw),
    });
    OsString::from_vec(out)
}

#[cfg(not(unix))]
fn transform_raw(name: &OsStr, _form: NormalizationForm) -> OsString {
    tracing::warn!("cannot convert non-Unicode name {}", name.to_string_lossy());
    name.to_os_string()
}

/// Byte-level [`split_name`]. `.` never occurs inside a multi-byte UTF-8
/// sequence, so both agree on valid names.
#[cfg(unix)]
fn split_bytes(name: &[u8]) -> (&[u8], &[u8]) {
    match name.iter().rposition(|&b| b == b'.') {
        Some(idx) if name[..idx].iter().any(|&b| b != b'.') => name.split_at(idx),
        _ => (name, &[]),
    }
}

/// Feeds `bytes` to `f` as alternating runs of valid text (`Ok`) and
/// undecodable bytes (`Err`).
#[cfg(unix)]
fn utf8_runs<'a>(mut bytes: &'a [u8], mut f: impl FnMut(Result<&'a str, &'a [u8]>)) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                f(Ok(text));
                return;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                if let Ok(text) = std::str::from_utf8(valid) {
                    if !text.is_empty() {
                        f(Ok(text));
                    }
                }
                let bad_len = err.error_len().unwrap_or(rest.len());
                let (raw, tail) = rest.split_at(bad_len);
                f(Err(raw));
                bytes = tail;
            }
        }
    }
}
