use crate::cue::Cue;
use crate::parser::Entry;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, trace};

/// Strips markup from subtitle text so that only what should be read
/// on screen is left.
pub struct TextCleaner {
    markup: Vec<Regex>,
}

const MARKUP_PATTERNS: &[&str] = &[
    // <i>, </b>, <c.yellow>, <v Speaker>, <font color="...">
    r"(?i)</?(?:i|b|u|s|c|v|font|lang|ruby|rt)(?:[.\s][^<>]*)?>",
    // <00:01:02.000>, <01:02.000>
    r"<(?:\d+:)?\d{2}:\d{2}\.\d{3}>",
    // ASS override blocks: {\an8}, {\i1}
    r"\{\\[^{}]*\}",
];

const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
    ("&lrm;", ""),
    ("&rlm;", ""),
    ("&amp;", "&"),
];

impl TextCleaner {
    pub fn new() -> Result<Self> {
        let markup = MARKUP_PATTERNS
            .iter()
            .map(|p| Regex::new(p).context("Invalid markup regex."))
            .collect::<Result<_>>()?;
        Ok(Self { markup })
    }

    /// Cleans every line and joins the non-blank ones with `\n`.
    pub fn clean<S: AsRef<str>>(&self, lines: &[S]) -> String {
        lines
            .iter()
            .map(|line| self.clean_line(line.as_ref()))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn clean_line(&self, line: &str) -> String {
        let mut line = line.to_string();
        for regex in &self.markup {
            if regex.is_match(&line) {
                trace!("Stripping /{}/ from \"{}\"", regex, line);
                line = regex.replace_all(&line, "").into_owned();
            }
        }
        for (entity, replacement) in ENTITIES {
            line = line.replace(entity, replacement);
        }
        line.trim().to_string()
    }
}

/// Turns parsed entries into a cue sequence that can be searched: markup
/// removed, sorted by start time, entries sharing a start time merged,
/// overlaps trimmed and indices assigned in order.
pub fn process(entries: Vec<Entry>, cleaner: &TextCleaner) -> Vec<Cue> {
    let mut entries: Vec<Entry> = entries
        .into_iter()
        .filter_map(|entry| {
            if entry.show_at >= entry.hide_at {
                debug!(show_at = ?entry.show_at, hide_at = ?entry.hide_at, "Dropping entry with empty interval");
                return None;
            }
            let text = cleaner.clean(&entry.text);
            if text.is_empty() {
                debug!(show_at = ?entry.show_at, "Dropping entry without text");
                return None;
            }
            Some(Entry {
                text: vec![text],
                ..entry
            })
        })
        .collect();
    entries.sort_by_key(|e| e.show_at);

    let entries = merge_simultaneous(entries);
    let entries = trim_overlaps(entries);
    generate_index(entries)
}

fn merge_simultaneous(entries: Vec<Entry>) -> Vec<Entry> {
    let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.last_mut() {
            Some(prev) if prev.show_at == entry.show_at => {
                debug!(show_at = ?entry.show_at, "Merging entries with the same start");
                prev.hide_at = prev.hide_at.max(entry.hide_at);
                prev.text.extend(entry.text);
            }
            _ => merged.push(entry),
        }
    }
    merged
}

// Starts are strictly increasing here, so trimming never empties an interval.
fn trim_overlaps(mut entries: Vec<Entry>) -> Vec<Entry> {
    for i in 1..entries.len() {
        let next_start = entries[i].show_at;
        let prev = &mut entries[i - 1];
        if prev.hide_at > next_start {
            debug!(from = ?prev.hide_at, to = ?next_start, "Trimming overlapping entry");
            prev.hide_at = next_start;
        }
    }
    entries
}

fn generate_index(entries: Vec<Entry>) -> Vec<Cue> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, e)| Cue::new(index, e.show_at, e.hide_at, e.text.join("\n")))
        .collect()
}
