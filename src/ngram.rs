use std::io::{self, Write};

/// Boundary marker wrapped around each clean run so edge n-grams are
/// distinguishable from interior ones. Never a valid Chinese character.
pub const BOUNDARY: char = '$';

/// Which side of a candidate word the emitted n-grams describe.
///
/// `Left` is not a separate algorithm: the run is reversed, the right-side
/// emission runs unchanged, and the aggregation stage un-reverses the keys
/// it produces. That yields preceding-context statistics from the same code
/// path as following-context ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
}

/// Emits the bounded n-gram fragments for one clean run.
///
/// The run (reversed first for [`Orientation::Left`]) is wrapped in boundary
/// markers, and for each of its `L` interior positions the fragment covering
/// that position plus the following `max_len` characters (capped at the end
/// of the wrapped string) becomes one line. Fragments are between 2 and
/// `max_len + 1` characters long, so proper prefixes (the candidate words)
/// reach length `max_len`.
pub fn emit_run(run: &str, max_len: usize, orientation: Orientation) -> Vec<String> {
    let mut chars: Vec<char> = run.chars().collect();
    if orientation == Orientation::Left {
        chars.reverse();
    }

    let mut wrapped = Vec::with_capacity(chars.len() + 2);
    wrapped.push(BOUNDARY);
    wrapped.extend(chars);
    wrapped.push(BOUNDARY);

    let total = wrapped.len();
    let mut lines = Vec::with_capacity(total - 2);
    for i in 1..total - 1 {
        let end = (i + max_len + 1).min(total);
        lines.push(wrapped[i..end].iter().collect());
    }
    lines
}

/// Writes the n-gram lines for one run to `out`, newline-terminated.
pub fn write_run<W: Write>(
    out: &mut W,
    run: &str,
    max_len: usize,
    orientation: Orientation,
) -> io::Result<()> {
    for line in emit_run(run, max_len, orientation) {
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Reverses a string character-wise; used to un-reverse left-oriented keys.
pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}
