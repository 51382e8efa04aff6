//! Text pre-processors for use as [`RenderOptions::pre_process`](crate::render::RenderOptions)
//!
//! Pre-processors run on expanded template text, just before evaluation.

use crate::error::Result;
use crate::render::PreProcess;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Repeat the table rows whose cell text matches `marker` once per item of
/// `iterable`, binding each item to `iterator`.
#[derive(Debug, Clone)]
pub struct TableLoop {
    marker: Regex,
    iterator: String,
    iterable: String,
}

impl TableLoop {
    /// `marker` is a regular expression searched for in each cell's text.
    pub fn new(
        marker: &str,
        iterator: impl Into<String>,
        iterable: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            marker: Regex::new(marker)?,
            iterator: iterator.into(),
            iterable: iterable.into(),
        })
    }

    /// Loop the rows with a cell that outputs `iterator` or one of its fields.
    pub fn for_iterator(iterator: &str, iterable: impl Into<String>) -> Result<Self> {
        let marker = format!(r"\{{\{{-?\s*{}\b", regex::escape(iterator));
        Self::new(&marker, iterator, iterable)
    }

    fn opening(&self) -> String {
        format!("{{% for {} in {} %}}", self.iterator, self.iterable)
    }
}

struct TableScanner {
    rows: Selector,
    tables: Selector,
    row_tag_re: Regex,
}

impl TableScanner {
    fn new() -> Self {
        Self {
            rows: Selector::parse("tr").expect("Failed to compile row selector"),
            tables: Selector::parse("table").expect("Failed to compile table selector"),
            row_tag_re: Regex::new(r"(?i)<(/?)tr\b[^>]*>").expect("Failed to compile row regex"),
        }
    }

    /// Text of a cell, unless it holds a nested table.
    fn cell_text(&self, cell: ElementRef<'_>) -> Option<String> {
        if cell.select(&self.tables).next().is_some() {
            return None;
        }
        Some(cell.text().collect())
    }

    fn row_matches(&self, row: ElementRef<'_>, marker: &Regex) -> bool {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| cell.value().name() == "td")
            .filter_map(|cell| self.cell_text(cell))
            .any(|text| marker.is_match(text.trim()))
    }

    /// Source span of every `<tr>...</tr>`, in order of the opening tags.
    fn row_spans(&self, text: &str) -> Option<Vec<Range<usize>>> {
        let mut spans: Vec<Range<usize>> = Vec::new();
        let mut open = Vec::new();
        for tag in self.row_tag_re.captures_iter(text) {
            let whole = tag.get(0)?;
            if tag[1].is_empty() {
                open.push(spans.len());
                spans.push(whole.start()..whole.start());
            } else {
                let row = open.pop()?;
                spans[row].end = whole.end();
            }
        }
        open.is_empty().then_some(spans)
    }

    /// Wrap the first run of adjacent sibling rows with a matching cell.
    fn wrap(&self, table_loop: &TableLoop, text: &str) -> String {
        let html = Html::parse_fragment(text);
        let rows: Vec<ElementRef<'_>> = html.select(&self.rows).collect();
        let Some(first) = rows
            .iter()
            .position(|row| self.row_matches(*row, &table_loop.marker))
        else {
            return text.to_string();
        };
        let spans = match self.row_spans(text) {
            Some(spans) if spans.len() == rows.len() => spans,
            _ => {
                debug!(iterable = %table_loop.iterable, "table rows are not well formed");
                return text.to_string();
            }
        };

        let mut last = first;
        while let Some(next) = rows[last]
            .next_siblings()
            .find_map(ElementRef::wrap)
            .filter(|sibling| sibling.value().name() == "tr")
            .and_then(|sibling| rows.iter().position(|row| row.id() == sibling.id()))
        {
            let adjacent = text[spans[last].end..spans[next].start].trim().is_empty();
            if !adjacent || !self.row_matches(rows[next], &table_loop.marker) {
                break;
            }
            last = next;
        }
        debug!(iterable = %table_loop.iterable, rows = last - first + 1, "looping table rows");

        let (start, end) = (spans[first].start, spans[last].end);
        let mut out = String::with_capacity(text.len() + 48);
        out.push_str(&text[..start]);
        out.push_str(&table_loop.opening());
        out.push_str(&text[start..end]);
        out.push_str("{% endfor %}");
        out.push_str(&text[end..]);
        out
    }
}

/// Apply each loop in turn to `template`.
pub fn loop_table_rows(loops: &[TableLoop], template: &str) -> String {
    // Use thread_local to compile the row and cell patterns once per thread
    thread_local! {
        static SCANNER: TableScanner = TableScanner::new();
    }

    SCANNER.with(|scanner| {
        loops
            .iter()
            .fold(template.to_string(), |text, table_loop| {
                scanner.wrap(table_loop, &text)
            })
    })
}

/// [`loop_table_rows`] packaged as a render pre-processor.
pub fn table_loops(loops: Vec<TableLoop>) -> PreProcess {
    Arc::new(move |text: &str| loop_table_rows(&loops, text))
}
