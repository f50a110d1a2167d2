//! Directory listing for `ls`.

use crate::error::{FmError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    // Declaration order is the sort order: directories first
    Directory,
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Directory => f.write_str("directory"),
            EntryKind::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// An entry whose metadata could not be read
#[derive(Debug)]
pub struct SkippedEntry {
    pub name: String,
    pub error: io::Error,
}

#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<ListingEntry>,
    pub skipped: Vec<SkippedEntry>,
}

/// List the immediate children of `dir`, sorted with [`sort_entries`].
///
/// Entries are classified through `metadata`, which follows symlinks, so a
/// dangling link lands in `skipped` instead of failing the whole listing.
pub async fn list_directory(dir: &Path) -> Result<Listing> {
    let mut read_dir = fs::read_dir(dir).await.map_err(|e| FmError::io(dir, e))?;
    let mut listing = Listing::default();

    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| FmError::io(dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        match fs::metadata(entry.path()).await {
            Ok(metadata) => {
                let kind = if metadata.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                listing.entries.push(ListingEntry { name, kind });
            }
            Err(error) => {
                tracing::warn!("Skipping {}: {}", entry.path().display(), error);
                listing.skipped.push(SkippedEntry { name, error });
            }
        }
    }

    sort_entries(&mut listing.entries);
    Ok(listing)
}

/// Directories before files, then by name ignoring case, ties broken by the
/// raw name so the order is total.
pub fn sort_entries(entries: &mut [ListingEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &ListingEntry, b: &ListingEntry) -> Ordering {
    a.kind
        .cmp(&b.kind)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Render entries as a bordered table with index, name and type columns.
pub fn render(entries: &[ListingEntry]) -> String {
    let headers = ["(index)", "Name", "Type"];
    let rows: Vec<[String; 3]> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| [i.to_string(), e.name.clone(), e.kind.to_string()])
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                line.push(mid);
            }
            line.push_str(&"─".repeat(width + 2));
        }
        line.push(right);
        line.push('\n');
        line
    };
    let row_line = |cells: [&str; 3]| {
        let mut line = String::from("│");
        for (cell, width) in cells.iter().zip(widths) {
            let pad = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
            line.push('│');
        }
        line.push('\n');
        line
    };

    let mut out = border('┌', '┬', '┐');
    out.push_str(&row_line(headers));
    out.push_str(&border('├', '┼', '┤'));
    for row in &rows {
        out.push_str(&row_line([&row[0], &row[1], &row[2]]));
    }
    out.push_str(&border('└', '┴', '┘'));
    out
}
