use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use log::debug;
use tempfile::TempDir;

/// Sorts arbitrarily large line streams with bounded memory.
///
/// Lines are buffered until the memory budget is reached, each full chunk is
/// sorted and spilled to a temp file, and the chunks are k-way merged into
/// the output. Ordering is byte-lexicographic (`str` ordering); equal lines
/// keep their chunk order, so the sort is stable. Input that fits in a
/// single chunk is sorted entirely in memory.
pub struct ExternalSorter {
    memory_budget: usize,
}

impl ExternalSorter {
    /// `memory_budget` is the number of bytes of line data held in memory
    /// before a chunk is spilled to disk.
    pub fn new(memory_budget: usize) -> Self {
        Self {
            memory_budget: memory_budget.max(1),
        }
    }

    /// Reads all lines from `input`, writes them to `output` in sorted
    /// order, newline-terminated.
    pub fn sort<R: Read, W: Write>(&self, input: R, output: W) -> Result<()> {
        let reader = BufReader::with_capacity(1 << 20, input);
        let mut writer = BufWriter::with_capacity(1 << 20, output);

        let spill_dir = TempDir::new().context("create spill directory for external sort")?;
        let mut spills: Vec<File> = Vec::new();

        let mut chunk: Vec<String> = Vec::new();
        let mut chunk_bytes = 0usize;
        for line in reader.lines() {
            let line = line.context("read line during external sort")?;
            chunk_bytes += line.len();
            chunk.push(line);
            if chunk_bytes >= self.memory_budget {
                spills.push(spill_chunk(&spill_dir, &mut chunk)?);
                chunk_bytes = 0;
            }
        }

        if spills.is_empty() {
            // Everything fit in one chunk; no disk round-trip needed.
            chunk.sort();
            for line in &chunk {
                writeln!(writer, "{line}")?;
            }
            writer.flush()?;
            return Ok(());
        }

        if !chunk.is_empty() {
            spills.push(spill_chunk(&spill_dir, &mut chunk)?);
        }
        debug!("external sort spilled {} chunk(s)", spills.len());
        merge_spills(spills, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn spill_chunk(dir: &TempDir, chunk: &mut Vec<String>) -> Result<File> {
    chunk.sort();
    let path = dir.path().join(format!("chunk_{:04}.txt", next_chunk_id()));
    let mut w = BufWriter::new(
        File::create(&path).with_context(|| format!("create spill file {}", path.display()))?,
    );
    for line in chunk.iter() {
        writeln!(w, "{line}")?;
    }
    w.flush()?;
    chunk.clear();
    let f = File::open(&path).with_context(|| format!("reopen spill file {}", path.display()))?;
    Ok(f)
}

// Spill files only need distinct names inside one private TempDir.
fn next_chunk_id() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static NEXT: AtomicU32 = AtomicU32::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// K-way merge over the sorted spill files. The heap is keyed on
/// `(line, chunk index)` so equal lines drain in chunk order.
fn merge_spills<W: Write>(spills: Vec<File>, writer: &mut W) -> Result<()> {
    let mut readers: Vec<_> = spills
        .into_iter()
        .map(|f| BufReader::with_capacity(1 << 16, f).lines())
        .collect();

    let mut heap: BinaryHeap<Reverse<(String, usize)>> = BinaryHeap::new();
    for (idx, lines) in readers.iter_mut().enumerate() {
        if let Some(line) = lines.next() {
            heap.push(Reverse((line.context("read spill file")?, idx)));
        }
    }

    while let Some(Reverse((line, idx))) = heap.pop() {
        writeln!(writer, "{line}")?;
        if let Some(next) = readers[idx].next() {
            heap.push(Reverse((next.context("read spill file")?, idx)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sort_lines(input: &str, budget: usize) -> Vec<String> {
        let sorter = ExternalSorter::new(budget);
        let mut out = Vec::new();
        sorter.sort(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn sorts_in_memory() {
        let got = sort_lines("banana\napple\ncherry\n", 1 << 20);
        assert_eq!(got, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn spilling_matches_in_memory_sort() {
        let mut lines: Vec<String> = (0..500)
            .map(|i| format!("line_{:03}", (i * 7919) % 500))
            .collect();
        let input = lines.join("\n") + "\n";
        // Tiny budget forces many spill chunks.
        let spilled = sort_lines(&input, 64);
        let in_memory = sort_lines(&input, 1 << 20);
        lines.sort();
        assert_eq!(spilled, lines);
        assert_eq!(spilled, in_memory);
    }

    #[test]
    fn duplicate_lines_survive() {
        let got = sort_lines("b\na\nb\na\nb\n", 2);
        assert_eq!(got, vec!["a", "a", "b", "b", "b"]);
    }

    #[test]
    fn byte_lexicographic_for_utf8() {
        // Multi-byte UTF-8 sorts after ASCII and by code point within CJK.
        let got = sort_lines("北\n$\n一\nz\n", 1 << 20);
        assert_eq!(got, vec!["$", "z", "一", "北"]);
    }

    #[test]
    fn empty_input() {
        assert!(sort_lines("", 16).is_empty());
    }
}
