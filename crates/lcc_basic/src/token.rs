//! Token kinds known to the front end.
//!
//! The identifier table stores a [`TokenKind`] in an 8-bit field of every
//! identifier record, so the whole enum must stay below 256 variants. The
//! keyword part of the enum and the keyword registration table are generated
//! from the same list and cannot drift apart.

use std::ops::BitOr;

// ---------------------------------------------------------------------------
// KeywordFlags
// ---------------------------------------------------------------------------

/// Which dialects a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordFlags(u8);

impl KeywordFlags {
    pub const NONE: Self = Self(0);
    /// A keyword in every dialect.
    pub const ALL: Self = Self(1 << 0);
    /// A keyword since C99.
    pub const C99: Self = Self(1 << 1);
    /// A GNU extension keyword.
    pub const GNU: Self = Self(1 << 2);
    /// A Microsoft extension keyword.
    pub const MS: Self = Self(1 << 3);
    /// `bool`, `true` and `false` when boolean keywords are enabled.
    pub const BOOL: Self = Self(1 << 4);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for KeywordFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

/// One entry of the keyword registration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub spelling: &'static str,
    pub kind: TokenKind,
    pub flags: KeywordFlags,
}

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

macro_rules! token_kinds {
    (
        tokens { $( $(#[$tmeta:meta])* $tok:ident => $text:literal, )* }
        keywords { $( $kw:ident => $spelling:literal : $($flag:ident)|+, )* }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum TokenKind {
            $( $(#[$tmeta])* $tok, )*
            $(
                #[doc = concat!("The `", $spelling, "` keyword.")]
                $kw,
            )*
        }

        impl TokenKind {
            /// Every kind, indexed by its discriminant.
            pub const ALL: &'static [TokenKind] = &[
                $( TokenKind::$tok, )*
                $( TokenKind::$kw, )*
            ];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $( TokenKind::$tok => $text, )*
                    $( TokenKind::$kw => $spelling, )*
                }
            }

            pub const fn is_keyword(self) -> bool {
                matches!(self, $( TokenKind::$kw )|*)
            }
        }

        /// Primary keyword spellings, one per keyword kind.
        pub static KEYWORDS: &[Keyword] = &[
            $(
                Keyword {
                    spelling: $spelling,
                    kind: TokenKind::$kw,
                    flags: KeywordFlags::NONE $( .union(KeywordFlags::$flag) )+,
                },
            )*
        ];
    };
}

token_kinds! {
    tokens {
        /// Not a token.
        Unknown => "unknown",
        /// End of file.
        Eof => "end of file",
        /// End of a macro argument list.
        Eom => "end of macro",
        /// A comment, only produced in comment-retention mode.
        Comment => "a comment",
        /// An identifier that is not a keyword.
        Identifier => "an identifier",
        NumericConstant => "a number",
        CharConstant => "a character constant",
        WideCharConstant => "a wide character constant",
        StringLiteral => "a string literal",
        WideStringLiteral => "a wide string literal",
        /// A `<header>` name inside `#include`.
        AngleStringLiteral => "a header name",

        LBrack => "[",
        RBrack => "]",
        LParen => "(",
        RParen => ")",
        LBrace => "{",
        RBrace => "}",
        Dot => ".",
        Ellipsis => "...",
        Amp => "&",
        AmpAmp => "&&",
        AmpEq => "&=",
        Star => "*",
        StarEq => "*=",
        Plus => "+",
        PlusPlus => "++",
        PlusEq => "+=",
        Minus => "-",
        Arrow => "->",
        MinusMinus => "--",
        MinusEq => "-=",
        Tilde => "~",
        Bang => "!",
        BangEq => "!=",
        Slash => "/",
        SlashEq => "/=",
        Percent => "%",
        PercentEq => "%=",
        Lt => "<",
        LtLt => "<<",
        LtEq => "<=",
        LtLtEq => "<<=",
        Gt => ">",
        GtGt => ">>",
        GtEq => ">=",
        GtGtEq => ">>=",
        Caret => "^",
        CaretEq => "^=",
        Pipe => "|",
        PipePipe => "||",
        PipeEq => "|=",
        Question => "?",
        Colon => ":",
        Semi => ";",
        Eq => "=",
        EqEq => "==",
        Comma => ",",
        Hash => "#",
        HashHash => "##",
        /// The Microsoft charize operator.
        HashAt => "#@",
    }
    keywords {
        KwAuto => "auto" : ALL,
        KwBreak => "break" : ALL,
        KwCase => "case" : ALL,
        KwChar => "char" : ALL,
        KwConst => "const" : ALL,
        KwContinue => "continue" : ALL,
        KwDefault => "default" : ALL,
        KwDo => "do" : ALL,
        KwDouble => "double" : ALL,
        KwElse => "else" : ALL,
        KwEnum => "enum" : ALL,
        KwExtern => "extern" : ALL,
        KwFloat => "float" : ALL,
        KwFor => "for" : ALL,
        KwGoto => "goto" : ALL,
        KwIf => "if" : ALL,
        KwInline => "inline" : C99 | GNU,
        KwInt => "int" : ALL,
        KwLong => "long" : ALL,
        KwRegister => "register" : ALL,
        KwRestrict => "restrict" : C99,
        KwReturn => "return" : ALL,
        KwShort => "short" : ALL,
        KwSigned => "signed" : ALL,
        KwSizeof => "sizeof" : ALL,
        KwStatic => "static" : ALL,
        KwStruct => "struct" : ALL,
        KwSwitch => "switch" : ALL,
        KwTypedef => "typedef" : ALL,
        KwUnion => "union" : ALL,
        KwUnsigned => "unsigned" : ALL,
        KwVoid => "void" : ALL,
        KwVolatile => "volatile" : ALL,
        KwWhile => "while" : ALL,
        KwUnderBool => "_Bool" : ALL,
        KwComplex => "_Complex" : ALL,
        KwImaginary => "_Imaginary" : ALL,
        KwBool => "bool" : BOOL,
        KwTrue => "true" : BOOL,
        KwFalse => "false" : BOOL,
        KwAsm => "asm" : GNU,
        KwTypeof => "typeof" : GNU,
        KwAlignof => "__alignof" : ALL,
        KwAttribute => "__attribute" : ALL,
        KwBuiltinVaArg => "__builtin_va_arg" : ALL,
        KwBuiltinOffsetof => "__builtin_offsetof" : ALL,
        KwBuiltinTypesCompatibleP => "__builtin_types_compatible_p" : ALL,
        KwBuiltinChooseExpr => "__builtin_choose_expr" : ALL,
        KwExtension => "__extension__" : ALL,
        KwImag => "__imag" : ALL,
        KwReal => "__real" : ALL,
        KwLabel => "__label__" : ALL,
        KwThread => "__thread" : ALL,
        KwFunc => "__func__" : ALL,
        KwFunction => "__FUNCTION__" : ALL,
        KwPrettyFunction => "__PRETTY_FUNCTION__" : ALL,
        KwDeclspec => "__declspec" : MS,
        KwCdecl => "__cdecl" : MS,
        KwStdcall => "__stdcall" : MS,
        KwFastcall => "__fastcall" : MS,
        KwForceinline => "__forceinline" : MS,
        KwPtr64 => "__ptr64" : MS,
        KwW64 => "__w64" : MS,
        KwInt8 => "__int8" : MS,
        KwInt16 => "__int16" : MS,
        KwInt32 => "__int32" : MS,
        KwInt64 => "__int64" : MS,
    }
}

/// Alternate spellings that lex as an existing keyword.
pub static KEYWORD_ALIASES: &[Keyword] = &[
    alias("__const", TokenKind::KwConst, KeywordFlags::ALL),
    alias("__const__", TokenKind::KwConst, KeywordFlags::ALL),
    alias("__inline", TokenKind::KwInline, KeywordFlags::ALL),
    alias("__inline__", TokenKind::KwInline, KeywordFlags::ALL),
    alias("__restrict", TokenKind::KwRestrict, KeywordFlags::ALL),
    alias("__restrict__", TokenKind::KwRestrict, KeywordFlags::ALL),
    alias("__signed", TokenKind::KwSigned, KeywordFlags::ALL),
    alias("__signed__", TokenKind::KwSigned, KeywordFlags::ALL),
    alias("__volatile", TokenKind::KwVolatile, KeywordFlags::ALL),
    alias("__volatile__", TokenKind::KwVolatile, KeywordFlags::ALL),
    alias("__typeof", TokenKind::KwTypeof, KeywordFlags::ALL),
    alias("__typeof__", TokenKind::KwTypeof, KeywordFlags::ALL),
    alias("__asm", TokenKind::KwAsm, KeywordFlags::ALL),
    alias("__asm__", TokenKind::KwAsm, KeywordFlags::ALL),
    alias("__attribute__", TokenKind::KwAttribute, KeywordFlags::ALL),
    alias("__alignof__", TokenKind::KwAlignof, KeywordFlags::ALL),
    alias("__imag__", TokenKind::KwImag, KeywordFlags::ALL),
    alias("__real__", TokenKind::KwReal, KeywordFlags::ALL),
    alias("_asm", TokenKind::KwAsm, KeywordFlags::MS),
    alias("_cdecl", TokenKind::KwCdecl, KeywordFlags::MS),
    alias("_stdcall", TokenKind::KwStdcall, KeywordFlags::MS),
    alias("_fastcall", TokenKind::KwFastcall, KeywordFlags::MS),
];

const fn alias(spelling: &'static str, kind: TokenKind, flags: KeywordFlags) -> Keyword {
    Keyword {
        spelling,
        kind,
        flags,
    }
}

impl TokenKind {
    /// Recovers a kind from the raw byte stored in an identifier record.
    #[inline]
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Unknown
            | TokenKind::Eof
            | TokenKind::Eom
            | TokenKind::Comment
            | TokenKind::Identifier
            | TokenKind::NumericConstant
            | TokenKind::CharConstant
            | TokenKind::WideCharConstant
            | TokenKind::StringLiteral
            | TokenKind::WideStringLiteral
            | TokenKind::AngleStringLiteral => f.write_str(self.as_str()),
            _ => write!(f, "`{}`", self.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// PPKeywordKind
// ---------------------------------------------------------------------------

/// Preprocessor directive names, as they appear after `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PPKeywordKind {
    NotKeyword,
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
    Endif,
    Defined,
    Include,
    Define,
    Undef,
    Line,
    Error,
    Pragma,
    Import,
    IncludeNext,
    Warning,
    Ident,
    Sccs,
    Assert,
    Unassert,
}

impl PPKeywordKind {
    /// Classifies a spelling as a directive name.
    pub fn from_spelling(spelling: &str) -> Self {
        static PP_KEYWORDS: phf::Map<&'static str, PPKeywordKind> = phf::phf_map! {
            "if" => PPKeywordKind::If,
            "ifdef" => PPKeywordKind::Ifdef,
            "ifndef" => PPKeywordKind::Ifndef,
            "elif" => PPKeywordKind::Elif,
            "else" => PPKeywordKind::Else,
            "endif" => PPKeywordKind::Endif,
            "defined" => PPKeywordKind::Defined,
            "include" => PPKeywordKind::Include,
            "define" => PPKeywordKind::Define,
            "undef" => PPKeywordKind::Undef,
            "line" => PPKeywordKind::Line,
            "error" => PPKeywordKind::Error,
            "pragma" => PPKeywordKind::Pragma,
            "import" => PPKeywordKind::Import,
            "include_next" => PPKeywordKind::IncludeNext,
            "warning" => PPKeywordKind::Warning,
            "ident" => PPKeywordKind::Ident,
            "sccs" => PPKeywordKind::Sccs,
            "assert" => PPKeywordKind::Assert,
            "unassert" => PPKeywordKind::Unassert,
        };
        PP_KEYWORDS
            .get(spelling)
            .copied()
            .unwrap_or(PPKeywordKind::NotKeyword)
    }
}
