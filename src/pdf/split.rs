//! PDF split
//!
//! Produces one document per page range, keeping only the pages in range.

use lopdf::Document;
use std::collections::HashSet;

use super::error::PdfError;

/// Inclusive, 1-indexed page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Parse `"1-1,2-3"` style ranges. A bare number is a single page.
pub fn parse_ranges(input: &str) -> Result<Vec<PageRange>, PdfError> {
    let mut ranges = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((s, e)) => (s.trim(), e.trim()),
            None => (part, part),
        };

        let parse = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| PdfError::InvalidRange(format!("'{}' is not a page number", s)))
        };
        let (start, end) = (parse(start)?, parse(end)?);

        if start == 0 {
            return Err(PdfError::InvalidRange("Page numbers must be >= 1".into()));
        }
        if start > end {
            return Err(PdfError::InvalidRange(format!(
                "Range {}-{} ends before it starts",
                start, end
            )));
        }

        ranges.push(PageRange::new(start, end));
    }

    if ranges.is_empty() {
        return Err(PdfError::InvalidRange("No ranges specified".into()));
    }

    Ok(ranges)
}

/// Keep only `pages` (1-indexed) of an already loaded document
fn extract_pages(doc: &Document, pages: &HashSet<u32>) -> Result<Vec<u8>, PdfError> {
    let page_count = doc.get_pages().len() as u32;
    let mut new_doc = doc.clone();

    // Delete in reverse so remaining numbers stay valid
    let pages_to_delete: Vec<u32> = (1..=page_count)
        .rev()
        .filter(|p| !pages.contains(p))
        .collect();
    new_doc.delete_pages(&pages_to_delete);

    new_doc.prune_objects();
    new_doc.compress();

    let mut buffer = Vec::new();
    new_doc
        .save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("Save failed: {}", e)))?;

    Ok(buffer)
}

/// Split a PDF into one document per range; with no ranges, one per page
pub fn split_document(
    bytes: &[u8],
    ranges: Option<&[PageRange]>,
) -> Result<Vec<Vec<u8>>, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    let ranges: Vec<PageRange> = match ranges {
        Some(ranges) if !ranges.is_empty() => ranges.to_vec(),
        _ => (1..=page_count).map(|p| PageRange::new(p, p)).collect(),
    };

    for range in &ranges {
        if range.start == 0 || range.end > page_count || range.start > range.end {
            return Err(PdfError::InvalidRange(format!(
                "Range {}-{} is outside the document (1-{})",
                range.start, range.end, page_count
            )));
        }
    }

    let outputs = ranges
        .iter()
        .map(|range| {
            let keep: HashSet<u32> = (range.start..=range.end).collect();
            extract_pages(&doc, &keep)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(pages = page_count, outputs = outputs.len(), "Split PDF");
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{create_test_pdf, page_texts};

    #[test]
    fn test_parse_ranges() {
        assert_eq!(
            parse_ranges("1-1,2-3").unwrap(),
            vec![PageRange::new(1, 1), PageRange::new(2, 3)]
        );
        assert_eq!(
            parse_ranges(" 4 , 5 - 7 ").unwrap(),
            vec![PageRange::new(4, 4), PageRange::new(5, 7)]
        );
        assert!(parse_ranges("").is_err());
        assert!(parse_ranges("0-2").is_err());
        assert!(parse_ranges("3-1").is_err());
        assert!(parse_ranges("a-b").is_err());
    }

    #[test]
    fn test_split_by_ranges() {
        let pdf = create_test_pdf(3, "S");
        let ranges = parse_ranges("1-1,2-3").unwrap();
        let outputs = split_document(&pdf, Some(ranges.as_slice())).unwrap();

        assert_eq!(outputs.len(), 2);
        let counts: Vec<usize> = outputs
            .iter()
            .map(|o| Document::load_mem(o).unwrap().get_pages().len())
            .collect();
        assert_eq!(counts, vec![1, 2]);

        assert_eq!(page_texts(&outputs[1]), vec!["S-Page-2", "S-Page-3"]);
    }

    #[test]
    fn test_split_defaults_to_one_file_per_page() {
        let pdf = create_test_pdf(4, "P");
        let outputs = split_document(&pdf, None).unwrap();
        assert_eq!(outputs.len(), 4);
        assert_eq!(page_texts(&outputs[2]), vec!["P-Page-3"]);
    }

    #[test]
    fn test_split_out_of_bounds() {
        let pdf = create_test_pdf(2, "X");
        let ranges = [PageRange::new(2, 5)];
        assert!(matches!(
            split_document(&pdf, Some(&ranges[..])),
            Err(PdfError::InvalidRange(_))
        ));
    }
}
