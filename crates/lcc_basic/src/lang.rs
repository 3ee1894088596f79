use std::{fmt, str::FromStr};

use thiserror::Error;

// ---------------------------------------------------------------------------
// LangError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LangError {
    #[error("unknown language standard `{0}` (expected one of: c89, c94, gnu89, c99, gnu99)")]
    UnknownStandard(String),
}

// ---------------------------------------------------------------------------
// LangStandard
// ---------------------------------------------------------------------------

/// The named C dialects a driver can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LangStandard {
    C89,
    C94,
    Gnu89,
    C99,
    #[default]
    Gnu99,
}

impl FromStr for LangStandard {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c89" | "c90" | "iso9899:1990" => Ok(Self::C89),
            "c94" | "iso9899:199409" => Ok(Self::C94),
            "gnu89" | "gnu90" => Ok(Self::Gnu89),
            "c99" | "iso9899:1999" => Ok(Self::C99),
            "gnu99" => Ok(Self::Gnu99),
            _ => Err(LangError::UnknownStandard(s.to_string())),
        }
    }
}

impl fmt::Display for LangStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::C89 => "c89",
            Self::C94 => "c94",
            Self::Gnu89 => "gnu89",
            Self::C99 => "c99",
            Self::Gnu99 => "gnu99",
        })
    }
}

// ---------------------------------------------------------------------------
// VisibilityMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityMode {
    #[default]
    Default,
    Protected,
    Hidden,
}

// ---------------------------------------------------------------------------
// LangOptions
// ---------------------------------------------------------------------------

/// Dialect switches controlling which flavour of C is accepted.
///
/// The identity layer only reads the keyword switches (`c99`, `gnu_mode`,
/// `microsoft`, `bool_`). Everything else is carried for the lexer and
/// later phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangOptions {
    /// Trigraphs in source files.
    pub trigraphs: bool,
    /// BCPL-style `//` comments.
    pub bcpl_comment: bool,
    /// `bool`, `true` and `false` keywords.
    pub bool_: bool,
    /// `$` allowed in identifiers.
    pub dollar_idents: bool,
    /// Preprocessor in assembler mode.
    pub asm_preprocessor: bool,
    /// GNU extensions on top of the selected standard.
    pub gnu_mode: bool,
    /// C89 implicit `int`.
    pub implicit_int: bool,
    pub digraphs: bool,
    /// Hexadecimal floating point constants.
    pub hex_floats: bool,
    pub c99: bool,
    /// Microsoft extensions.
    pub microsoft: bool,
    /// Do not treat library functions as builtins.
    pub no_builtin: bool,
    /// Emit all declarations, even unused ones.
    pub emit_all_decls: bool,
    /// Whether `__OPTIMIZE__` should be defined.
    pub optimize: bool,
    /// Whether `__OPTIMIZE_SIZE__` should be defined.
    pub optimize_size: bool,
    /// `__STATIC__` rather than `__DYNAMIC__`.
    pub static_: bool,
    /// GNU inline semantics instead of C99 ones.
    pub gnu_inline: bool,
    /// Whether `__NO_INLINE__` should be defined.
    pub no_inline: bool,
    pub instantiation_depth: u32,
    visibility: VisibilityMode,
    /// Name shown for the main file in diagnostics, when it differs from the
    /// path actually read. Never used to resolve files.
    main_file_name: Option<String>,
}

impl Default for LangOptions {
    fn default() -> Self {
        Self {
            trigraphs: false,
            bcpl_comment: false,
            bool_: false,
            dollar_idents: false,
            asm_preprocessor: false,
            gnu_mode: false,
            implicit_int: false,
            digraphs: false,
            hex_floats: false,
            c99: false,
            microsoft: false,
            no_builtin: false,
            emit_all_decls: false,
            optimize: false,
            optimize_size: false,
            static_: false,
            gnu_inline: false,
            no_inline: false,
            instantiation_depth: 99,
            visibility: VisibilityMode::Default,
            main_file_name: None,
        }
    }
}

impl LangOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a named standard, with everything else at its default.
    pub fn from_standard(standard: LangStandard) -> Self {
        let mut opts = Self {
            bcpl_comment: true,
            dollar_idents: true,
            ..Self::default()
        };
        match standard {
            LangStandard::C89 => {
                opts.bcpl_comment = false;
                opts.implicit_int = true;
                opts.trigraphs = true;
            }
            LangStandard::C94 => {
                opts.bcpl_comment = false;
                opts.implicit_int = true;
                opts.trigraphs = true;
                opts.digraphs = true;
            }
            LangStandard::Gnu89 => {
                opts.implicit_int = true;
                opts.gnu_mode = true;
                opts.gnu_inline = true;
            }
            LangStandard::C99 => {
                opts.c99 = true;
                opts.digraphs = true;
                opts.hex_floats = true;
                opts.trigraphs = true;
            }
            LangStandard::Gnu99 => {
                opts.c99 = true;
                opts.digraphs = true;
                opts.hex_floats = true;
                opts.gnu_mode = true;
            }
        }
        opts
    }

    #[inline]
    pub fn main_file_name(&self) -> Option<&str> {
        self.main_file_name.as_deref()
    }

    pub fn set_main_file_name(&mut self, name: impl Into<String>) {
        self.main_file_name = Some(name.into());
    }

    #[inline]
    pub fn visibility_mode(&self) -> VisibilityMode {
        self.visibility
    }

    pub fn set_visibility_mode(&mut self, mode: VisibilityMode) {
        self.visibility = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = LangOptions::new();
        assert!(!opts.c99);
        assert!(!opts.gnu_mode);
        assert_eq!(opts.instantiation_depth, 99);
        assert_eq!(opts.visibility_mode(), VisibilityMode::Default);
        assert_eq!(opts.main_file_name(), None);
    }

    #[test]
    fn standards_parse_and_display() {
        assert_eq!("c99".parse::<LangStandard>(), Ok(LangStandard::C99));
        assert_eq!("gnu90".parse::<LangStandard>(), Ok(LangStandard::Gnu89));
        assert_eq!(LangStandard::Gnu99.to_string(), "gnu99");
        assert_eq!(
            "c++11".parse::<LangStandard>(),
            Err(LangError::UnknownStandard("c++11".to_string()))
        );
    }

    #[test]
    fn standards_set_the_keyword_switches() {
        let c89 = LangOptions::from_standard(LangStandard::C89);
        assert!(!c89.c99 && !c89.gnu_mode && c89.implicit_int);

        let gnu99 = LangOptions::from_standard(LangStandard::Gnu99);
        assert!(gnu99.c99 && gnu99.gnu_mode && !gnu99.trigraphs);
    }

    #[test]
    fn main_file_name_is_display_only_state() {
        let mut opts = LangOptions::new();
        opts.set_main_file_name("input.c");
        opts.set_visibility_mode(VisibilityMode::Hidden);
        assert_eq!(opts.main_file_name(), Some("input.c"));
        assert_eq!(opts.visibility_mode(), VisibilityMode::Hidden);
    }
}
