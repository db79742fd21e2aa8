//! Word wrapping
//!
//! Splits text into lines no wider than a pixel budget, measuring with
//! whatever the caller supplies (normally the draw surface's text
//! metrics). Lines break at spaces; a word wider than the budget on its
//! own is force-split between characters. Explicit `'\n'` always breaks.

/// Iterator over wrapped lines, borrowing from the source text
pub struct WrapLines<'a, F> {
    rest: &'a str,
    max_width: i32,
    measure: F,
    done: bool,
}

/// Wrap `text` to `max_width` pixels
pub fn wrap_lines<F>(text: &str, max_width: i32, measure: F) -> WrapLines<'_, F>
where
    F: Fn(&str) -> i32,
{
    WrapLines {
        rest: text,
        max_width,
        measure,
        done: false,
    }
}

/// Number of lines `text` wraps to
pub fn line_count<F>(text: &str, max_width: i32, measure: F) -> usize
where
    F: Fn(&str) -> i32,
{
    wrap_lines(text, max_width, measure).count()
}

impl<'a, F> WrapLines<'a, F>
where
    F: Fn(&str) -> i32,
{
    /// Take one line off the front of a paragraph
    ///
    /// Returns the line and how many bytes of `para` it consumed,
    /// including the spaces after it.
    fn take_line(&self, para: &'a str) -> (&'a str, usize) {
        if (self.measure)(para) <= self.max_width {
            return (para.trim_end_matches(' '), para.len());
        }

        let mut fitted = 0;
        let mut pos = 0;
        while pos < para.len() {
            let word_start = match para[pos..].find(|c| c != ' ') {
                Some(off) => pos + off,
                None => break,
            };
            let word_end = match para[word_start..].find(' ') {
                Some(off) => word_start + off,
                None => para.len(),
            };
            if (self.measure)(&para[..word_end]) > self.max_width {
                break;
            }
            fitted = word_end;
            pos = word_end;
        }

        if fitted == 0 {
            // A single word wider than the line
            let mut end = 0;
            for (i, c) in para.char_indices() {
                let next = i + c.len_utf8();
                if end > 0 && (self.measure)(&para[..next]) > self.max_width {
                    break;
                }
                end = next;
            }
            return (&para[..end], end);
        }

        let consumed = fitted + (para[fitted..].len() - para[fitted..].trim_start_matches(' ').len());
        (&para[..fitted], consumed)
    }
}

impl<'a, F> Iterator for WrapLines<'a, F>
where
    F: Fn(&str) -> i32,
{
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }

        let para_end = self.rest.find('\n').unwrap_or(self.rest.len());
        let para = &self.rest[..para_end];
        let (line, consumed) = self.take_line(para);

        if consumed >= para.len() {
            if para_end < self.rest.len() {
                self.rest = &self.rest[para_end + 1..];
            } else {
                self.done = true;
            }
        } else {
            self.rest = &self.rest[consumed..];
        }

        Some(line)
    }
}
