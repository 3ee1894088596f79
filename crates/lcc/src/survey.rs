use crate::scan::Words;

use lcc_basic::{FileId, FileManager, IdentifierTable, LangOptions, TokenKind};

use thiserror::Error;

use std::{collections::HashMap, io::Write};

// ---------------------------------------------------------------------------
// SurveyError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("{0}: no such file")]
    NoSuchFile(String),
    #[error("{0}: path is not valid UTF-8")]
    NonUtf8Path(String),
    #[error("{path}: could not read file")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// FileReport
// ---------------------------------------------------------------------------

/// What surveying one file found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: FileId,
    pub uid: u32,
    /// Size recorded by the file manager when the file was first resolved.
    pub size: u64,
    /// Identifier-shaped words, keywords included.
    pub words: usize,
    /// Words the identifier table classifies as keywords.
    pub keywords: usize,
    /// Words that are extension keywords under the current options.
    pub extensions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First time this file was seen.
    Surveyed(FileReport),
    /// The path names a file already surveyed under another spelling.
    Duplicate { file: FileId, first: String },
}

// ---------------------------------------------------------------------------
// Survey
// ---------------------------------------------------------------------------

/// Runs source files through the file manager and the identifier table.
pub struct Survey {
    opts: LangOptions,
    files: FileManager,
    idents: IdentifierTable,
    surveyed: HashMap<FileId, FileReport>,
}

impl Survey {
    pub fn new(opts: LangOptions) -> Self {
        let idents = IdentifierTable::new(&opts);
        Self {
            opts,
            idents,
            files: FileManager::new(),
            surveyed: HashMap::new(),
        }
    }

    #[inline]
    pub fn files(&self) -> &FileManager {
        &self.files
    }

    #[inline]
    pub fn idents(&self) -> &IdentifierTable {
        &self.idents
    }

    /// Resolves `path`, and unless the file was already surveyed through
    /// some other spelling, interns every word in it.
    pub fn add_file(&mut self, path: &str) -> Result<Outcome, SurveyError> {
        let file = self
            .files
            .get_file(path)
            .ok_or_else(|| SurveyError::NoSuchFile(path.to_string()))?;
        if self.surveyed.contains_key(&file) {
            let first = self.files.file_name(file).to_string();
            tracing::debug!(path, first = %first, "already surveyed");
            return Ok(Outcome::Duplicate { file, first });
        }

        let bytes = std::fs::read(path).map_err(|source| SurveyError::Read {
            path: path.to_string(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let entry = self.files[file];
        let mut report = FileReport {
            file,
            uid: entry.uid(),
            size: entry.size(),
            words: 0,
            keywords: 0,
            extensions: 0,
        };
        for word in Words::new(&text, self.opts.dollar_idents) {
            let id = self.idents.get(word);
            let info = &self.idents[id];
            report.words += 1;
            if info.token_id() != TokenKind::Identifier {
                report.keywords += 1;
                if info.is_extension_token() {
                    report.extensions += 1;
                }
            }
        }
        tracing::debug!(path, uid = report.uid, words = report.words, "surveyed");
        self.surveyed.insert(file, report.clone());
        Ok(Outcome::Surveyed(report))
    }

    /// The name to show for `file`: the main file name override for the
    /// first surveyed file, the first-seen path otherwise.
    pub fn display_name(&self, file: FileId) -> &str {
        match self.opts.main_file_name() {
            Some(name) if self.files[file].uid() == 0 => name,
            _ => self.files.file_name(file),
        }
    }

    /// Writes one line per interned identifier, in first-seen order.
    pub fn dump_identifiers(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for (spelling, id) in self.idents.spellings() {
            let info = &self.idents[id];
            write!(writer, "{:<24} {}", spelling, info.token_id())?;
            if info.is_extension_token() {
                write!(writer, " [extension]")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn print_stats(&self, writer: &mut impl Write) -> std::io::Result<()> {
        self.files.print_stats(writer)?;
        self.idents.print_stats(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lcc_basic::LangStandard;

    use std::path::Path;

    fn path(p: &Path) -> &str {
        p.to_str().unwrap()
    }

    #[test]
    fn counts_words_and_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.c");
        std::fs::write(&main, "int main(void) { return foo; } // int\n").unwrap();

        let mut survey = Survey::new(LangOptions::from_standard(LangStandard::C99));
        let Outcome::Surveyed(report) = survey.add_file(path(&main)).unwrap() else {
            panic!("expected a fresh file");
        };
        assert_eq!(report.uid, 0);
        assert_eq!(report.size, 38);
        assert_eq!(report.words, 5);
        assert_eq!(report.keywords, 3);
        assert_eq!(report.extensions, 0);
        assert!(survey.idents().find("foo").is_some());
    }

    #[test]
    fn extension_keywords_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("ext.c");
        std::fs::write(&main, "typeof(x) y; __int64 z;").unwrap();

        let mut opts = LangOptions::from_standard(LangStandard::Gnu99);
        opts.microsoft = true;
        let mut survey = Survey::new(opts);
        let Outcome::Surveyed(report) = survey.add_file(path(&main)).unwrap() else {
            panic!("expected a fresh file");
        };
        assert_eq!(report.words, 5);
        assert_eq!(report.keywords, 2);
        assert_eq!(report.extensions, 2);
    }

    #[test]
    fn aliases_are_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let direct = dir.path().join("a.c");
        let indirect = dir.path().join("src").join("..").join("a.c");
        std::fs::write(&direct, "x").unwrap();

        let mut survey = Survey::new(LangOptions::new());
        let first = survey.add_file(path(&direct)).unwrap();
        let Outcome::Surveyed(report) = first else {
            panic!("expected a fresh file");
        };
        let second = survey.add_file(path(&indirect)).unwrap();
        assert_eq!(
            second,
            Outcome::Duplicate {
                file: report.file,
                first: path(&direct).to_string(),
            }
        );
        assert_eq!(survey.files().num_unique_files(), 1);
    }

    #[test]
    fn missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.c");
        let mut survey = Survey::new(LangOptions::new());
        let err = survey.add_file(path(&missing)).unwrap_err();
        assert!(matches!(err, SurveyError::NoSuchFile(_)));
        assert!(err.to_string().ends_with("missing.c: no such file"));

        let err = survey.add_file(path(dir.path())).unwrap_err();
        assert!(matches!(err, SurveyError::NoSuchFile(_)));
    }

    #[test]
    fn main_file_name_only_renames_the_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.c");
        let b = dir.path().join("b.c");
        std::fs::write(&a, "").unwrap();
        std::fs::write(&b, "").unwrap();

        let mut opts = LangOptions::new();
        opts.set_main_file_name("input.c");
        let mut survey = Survey::new(opts);
        let Outcome::Surveyed(ra) = survey.add_file(path(&a)).unwrap() else {
            panic!("expected a fresh file");
        };
        let Outcome::Surveyed(rb) = survey.add_file(path(&b)).unwrap() else {
            panic!("expected a fresh file");
        };
        assert_eq!(survey.display_name(ra.file), "input.c");
        assert_eq!(survey.display_name(rb.file), path(&b));
    }

    #[test]
    fn dump_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.c");
        std::fs::write(&main, "while (zz) zz;").unwrap();

        let mut survey = Survey::new(LangOptions::new());
        survey.add_file(path(&main)).unwrap();

        let mut out = Vec::new();
        survey.dump_identifiers(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.lines().any(|l| l.starts_with("zz ") && l.ends_with("identifier")));
        assert!(out.lines().any(|l| l.starts_with("while ") && l.ends_with("`while`")));

        let mut out = Vec::new();
        survey.print_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("*** File Manager Stats:"));
        assert!(out.contains("1 files found, 1 dirs found."));
        assert!(out.contains("*** Identifier Table Stats:"));
    }
}
