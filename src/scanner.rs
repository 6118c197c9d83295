//! Character-offset scanning helpers shared by the math and text compilers.

/// Byte-offset view over an expression's raw text.
///
/// Every grammar-significant character is ASCII, so every offset returned here falls on
/// a UTF-8 character boundary and can be used for slicing.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One raw parameter extracted from a parameter list.
pub struct Piece<'a> {
    /// Parameter text, untrimmed.
    pub text: &'a str,
    /// Byte offset of the first parameter character.
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of scanning a parameter list that starts just after `(`.
pub struct ParameterList<'a> {
    /// Parameters in order. The last one is the text between the final top-level comma
    /// (or the opening parenthesis) and the stop position, and may be empty.
    pub pieces: Vec<Piece<'a>>,
    /// Offset of the matching `)`, or `None` if the text ended first.
    pub close: Option<usize>,
    /// Offset where scanning stopped.
    pub end: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn peek(&self, at: usize) -> Option<u8> {
        self.text.as_bytes().get(at).copied()
    }

    /// Substring `[start, end)`, clamped to the text.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.text.len());
        let start = start.min(end);
        &self.text[start..end]
    }

    /// First occurrence of `ch` at or after `from`.
    pub fn find(&self, ch: u8, from: usize) -> Option<usize> {
        self.text
            .as_bytes()
            .get(from..)?
            .iter()
            .position(|b| *b == ch)
            .map(|offset| from + offset)
    }

    /// First occurrence of any byte of `set` at or after `from`.
    pub fn find_any(&self, set: &str, from: usize) -> Option<usize> {
        let set = set.as_bytes();
        self.text
            .as_bytes()
            .get(from..)?
            .iter()
            .position(|b| set.contains(b))
            .map(|offset| from + offset)
    }

    /// Last occurrence of any byte of `set` strictly before `end`.
    pub fn rfind_any_before(&self, set: &str, end: usize) -> Option<usize> {
        let set = set.as_bytes();
        let end = end.min(self.text.len());
        self.text.as_bytes()[..end]
            .iter()
            .rposition(|b| set.contains(b))
    }

    /// Start of the name ending at `end`: one past the last separator before it.
    pub fn name_start(&self, separators: &str, end: usize) -> usize {
        self.rfind_any_before(separators, end)
            .map_or(0, |separator| separator + 1)
    }

    /// Position of the `(` opening a parameter list, allowing only spaces before it.
    pub fn open_paren_from(&self, from: usize) -> Option<usize> {
        let mut pos = from;
        loop {
            match self.peek(pos)? {
                b'(' => return Some(pos),
                b' ' => pos += 1,
                _ => return None,
            }
        }
    }

    /// Next `"` at or after `from` that is not preceded by `\`.
    pub fn closing_quote(&self, from: usize) -> Option<usize> {
        let mut candidate = self.find(b'"', from)?;
        while candidate > 0 && self.peek(candidate - 1) == Some(b'\\') {
            candidate = self.find(b'"', candidate + 1)?;
        }
        Some(candidate)
    }

    /// Splits a parameter list starting at `start` (just after its `(`).
    ///
    /// Depth only changes outside quoted spans. Quotes toggle on `"` not preceded by
    /// `\`. Top-level commas outside quotes split parameters; scanning stops on the
    /// depth-0 `)` outside quotes.
    pub fn parameter_list(&self, start: usize) -> ParameterList<'a> {
        let bytes = self.text.as_bytes();
        let mut pieces = Vec::new();
        let mut level = 0usize;
        let mut in_quotes = false;
        let mut previous = b'(';
        let mut piece_start = start;
        let mut pos = start;

        while pos < bytes.len() {
            let ch = bytes[pos];
            if ch == b'"' && previous != b'\\' {
                in_quotes = !in_quotes;
            }
            if !in_quotes {
                match ch {
                    b')' if level == 0 => break,
                    b'(' => level += 1,
                    b')' => level -= 1,
                    b',' if level == 0 => {
                        pieces.push(Piece {
                            text: &self.text[piece_start..pos],
                            start: piece_start,
                        });
                        piece_start = pos + 1;
                    }
                    _ => {}
                }
            }
            previous = ch;
            pos += 1;
        }

        pieces.push(Piece {
            text: self.slice(piece_start, pos),
            start: piece_start.min(pos),
        });

        ParameterList {
            pieces,
            close: (pos < bytes.len()).then_some(pos),
            end: pos,
        }
    }
}

/// Whether `earlier` comes strictly before `later`, treating `None` as "never found".
pub fn precedes(earlier: Option<usize>, later: Option<usize>) -> bool {
    match (earlier, later) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Earliest of the found positions.
pub fn earliest(positions: &[Option<usize>]) -> Option<usize> {
    positions.iter().flatten().copied().min()
}

/// Object names encode spaces as `~`.
pub fn restore_spaces(name: &str) -> String {
    name.replace('~', " ")
}

/// Replaces every `\"` with `"`.
pub fn unescape_quotes(text: &str) -> String {
    text.replace("\\\"", "\"")
}

/// Whether any character except the last one belongs to `separators`.
pub fn has_inner_separator(name: &str, separators: &str) -> bool {
    let Some((last, _)) = name.char_indices().last() else {
        return false;
    };
    name[..last].chars().any(|c| separators.contains(c))
}
