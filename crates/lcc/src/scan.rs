use peeking_take_while::PeekableExt;

use std::{iter::Peekable, str::CharIndices};

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Iterates over the identifier-shaped words of a C source text.
///
/// A word starts with an ASCII letter or `_` and continues with letters,
/// digits and `_` (and `$` when `dollar_idents` is set). Comments, string
/// and character literals and numbers are skipped, so `0x1f` or `"if"`
/// produce no words.
pub struct Words<'a> {
    text: &'a str,
    dollar_idents: bool,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Words<'a> {
    pub fn new(text: &'a str, dollar_idents: bool) -> Self {
        Self {
            text,
            dollar_idents,
            chars: text.char_indices().peekable(),
        }
    }

    fn is_word_start(&self, c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_' || (self.dollar_idents && c == '$')
    }

    fn skip_number(&mut self) {
        self.chars
            .peeking_take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
            .for_each(drop);
    }

    fn skip_quoted(&mut self, quote: char) {
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    self.chars.next();
                }
                '\n' => return,
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.chars
            .peeking_take_while(|(_, c)| *c != '\n')
            .for_each(drop);
    }

    fn skip_block_comment(&mut self) {
        let mut star = false;
        for (_, c) in self.chars.by_ref() {
            if star && c == '/' {
                return;
            }
            star = c == '*';
        }
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some((start, c)) = self.chars.next() {
            match c {
                c if self.is_word_start(c) => {
                    let dollar_idents = self.dollar_idents;
                    let end = self
                        .chars
                        .peeking_take_while(|(_, c)| {
                            c.is_ascii_alphanumeric() || *c == '_' || (dollar_idents && *c == '$')
                        })
                        .last()
                        .map(|(end, _)| end + 1)
                        .unwrap_or(start + 1);
                    return Some(&self.text[start..end]);
                }
                c if c.is_ascii_digit() => self.skip_number(),
                '"' | '\'' => self.skip_quoted(c),
                '/' => match self.chars.peek() {
                    Some((_, '/')) => self.skip_line_comment(),
                    Some((_, '*')) => {
                        self.chars.next();
                        self.skip_block_comment();
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        Words::new(text, false).collect()
    }

    #[test]
    fn splits_on_punctuation() {
        assert_eq!(
            words("int main(void) { return x_1+_y; }"),
            vec!["int", "main", "void", "return", "x_1", "_y"]
        );
    }

    #[test]
    fn skips_numbers() {
        assert_eq!(words("a = 0x1f + 1.5e3f + 10ul;"), vec!["a"]);
    }

    #[test]
    fn skips_literals_and_comments() {
        let text = "s = \"if \\\" else\"; c = 'x'; // while\n/* for\n do */ end";
        assert_eq!(words(text), vec!["s", "c", "end"]);
    }

    #[test]
    fn wide_literal_prefix_is_a_word() {
        assert_eq!(words("L\"abc\""), vec!["L"]);
    }

    #[test]
    fn dollar_idents() {
        assert_eq!(words("a$b"), vec!["a", "b"]);
        let dollars: Vec<_> = Words::new("a$b $c", true).collect();
        assert_eq!(dollars, vec!["a$b", "$c"]);
    }

    #[test]
    fn unterminated_constructs_end_the_text() {
        assert_eq!(words("x /* never closed"), vec!["x"]);
        assert_eq!(words("y \"open\nz"), vec!["y", "z"]);
        assert!(words("").is_empty());
    }

    #[test]
    fn division_is_not_a_comment() {
        assert_eq!(words("a / b"), vec!["a", "b"]);
    }
}
