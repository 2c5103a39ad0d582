//! Index of the header cells in provider markup.
//!
//! The provider renders a `table.pd-table` whose column headers carry
//! `pd-col-head` and row headers `pd-row-head`. Each header names its logical
//! id through the `--pd-df-iloc` custom property, either inline or in a
//! leading `<style>` block keyed by per-column and per-row classes (the way a
//! pandas `Styler` renders table styles). Row headers may span several body
//! rows. The index records headers in document order so a surface can
//! address them by position.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::types::{ColumnId, RowId};
use crate::xml_helpers::{
    attr_string, attr_u32, class_list, css_rules, local_name_string, style_property,
    subject_compound,
};

/// Class of the scroll region.
pub const VIEW_CLASS: &str = "pd-view";
/// Class of the table element.
pub const TABLE_CLASS: &str = "pd-table";
/// Class of column header cells.
pub const COL_HEAD_CLASS: &str = "pd-col-head";
/// Class of row header cells.
pub const ROW_HEAD_CLASS: &str = "pd-row-head";
/// Draggable label inside a column header.
pub const COL_TEXT_CLASS: &str = "pd-col-text";
/// Filter icon inside a column header.
pub const FILTER_ICON_CLASS: &str = "pd-col-i-filter";
/// Search input.
pub const SEARCH_CLASS: &str = "pd-search";
/// Custom property carrying a header's logical id.
pub const ILOC_PROPERTY: &str = "--pd-df-iloc";

/// Which axis a header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadKind {
    Column,
    Row,
}

impl HeadKind {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Column => COL_HEAD_CLASS,
            Self::Row => ROW_HEAD_CLASS,
        }
    }
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    pub kind: HeadKind,
    /// Logical id from `--pd-df-iloc`.
    pub id: u32,
    /// Position among all indexed headers, in document order.
    pub position: usize,
    /// Body rows covered (1 for column headers).
    pub rowspan: u32,
    /// Body row the header starts in (row headers only).
    pub body_row: Option<usize>,
    /// Classes as rendered by the provider.
    pub classes: Vec<String>,
}

impl HeadInfo {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A stylesheet rule assigning `--pd-df-iloc` to a class combination.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IlocRule {
    tag: Option<String>,
    classes: Vec<String>,
    id: u32,
}

impl IlocRule {
    fn matches(&self, tag: &str, classes: &[String]) -> bool {
        self.tag.as_deref().map_or(true, |t| t == tag)
            && self.classes.iter().all(|c| classes.contains(c))
    }
}

/// Class-keyed `--pd-df-iloc` rules of one stylesheet, in source order.
fn iloc_rules(css: &str) -> Vec<IlocRule> {
    let mut rules = Vec::new();
    for (selectors, declarations) in css_rules(css) {
        let Some(id) = style_property(declarations, ILOC_PROPERTY).and_then(|v| v.parse().ok())
        else {
            continue;
        };
        for selector in selectors.split(',') {
            if let Some((tag, classes)) = subject_compound(selector) {
                // a bare `th` rule would tag every header alike
                if !classes.is_empty() {
                    rules.push(IlocRule { tag, classes, id });
                }
            }
        }
    }
    rules
}

/// Header cells and body shape of one mounted markup string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupIndex {
    heads: Vec<HeadInfo>,
    /// Logical id of each body row, from its innermost row header.
    row_ids: Vec<Option<RowId>>,
    has_table: bool,
}

impl MarkupIndex {
    /// Tokenize `markup` and index its headers.
    ///
    /// An inline `--pd-df-iloc` wins; otherwise the last matching rule of a
    /// preceding `<style>` block applies. Header cells with neither are
    /// skipped. Markup that is not a table yields an empty index, not an
    /// error.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut xml = Reader::from_reader(markup.as_bytes());
        xml.trim_text(true);
        xml.check_end_names(false);

        let mut index = MarkupIndex::default();
        let mut in_body = false;
        let mut in_style = false;
        let mut rules: Vec<IlocRule> = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match xml.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => match local_name_string(e).as_str() {
                    "table" => {
                        if class_list(e).iter().any(|c| c == TABLE_CLASS) {
                            index.has_table = true;
                        }
                    }
                    "tbody" => in_body = true,
                    "style" => in_style = true,
                    "tr" if in_body => index.row_ids.push(None),
                    "th" => {
                        let classes = class_list(e);
                        let kind = if classes.iter().any(|c| c == COL_HEAD_CLASS) {
                            HeadKind::Column
                        } else if classes.iter().any(|c| c == ROW_HEAD_CLASS) {
                            HeadKind::Row
                        } else {
                            continue;
                        };
                        let inline = attr_string(e, b"style")
                            .as_deref()
                            .and_then(|s| style_property(s, ILOC_PROPERTY))
                            .and_then(|v| v.parse::<u32>().ok());
                        let Some(id) = inline.or_else(|| {
                            rules
                                .iter()
                                .rev()
                                .find(|rule| rule.matches("th", &classes))
                                .map(|rule| rule.id)
                        }) else {
                            continue;
                        };
                        let body_row = match kind {
                            HeadKind::Row if in_body => index.row_ids.len().checked_sub(1),
                            _ => None,
                        };
                        if let (HeadKind::Row, Some(row)) = (kind, body_row) {
                            // innermost header wins
                            if let Some(slot) = index.row_ids.get_mut(row) {
                                *slot = Some(id);
                            }
                        }
                        index.heads.push(HeadInfo {
                            kind,
                            id,
                            position: index.heads.len(),
                            rowspan: attr_u32(e, b"rowspan").unwrap_or(1).max(1),
                            body_row,
                            classes,
                        });
                    }
                    _ => {}
                },
                Event::Text(ref e) if in_style => {
                    rules.extend(iloc_rules(&String::from_utf8_lossy(e)));
                }
                Event::End(ref e) => {
                    let name = e.local_name();
                    if name.as_ref().eq_ignore_ascii_case(b"tbody") {
                        in_body = false;
                    } else if name.as_ref().eq_ignore_ascii_case(b"style") {
                        in_style = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(index)
    }

    /// Every indexed header in document order.
    pub fn heads(&self) -> &[HeadInfo] {
        &self.heads
    }

    /// Header at `position`.
    pub fn head(&self, position: usize) -> Option<&HeadInfo> {
        self.heads.get(position)
    }

    /// Headers of one kind, in document order.
    pub fn heads_of(&self, kind: HeadKind) -> impl Iterator<Item = &HeadInfo> {
        self.heads.iter().filter(move |h| h.kind == kind)
    }

    /// Logical column ids in mounted left-to-right order.
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.heads_of(HeadKind::Column).map(|h| h.id).collect()
    }

    /// Row ids covered by the row header at `position`.
    ///
    /// A header spanning N body rows addresses the rows it visually groups,
    /// in display order. Returns an empty group for anything else.
    pub fn row_group(&self, position: usize) -> Vec<RowId> {
        let Some(head) = self.head(position) else {
            return Vec::new();
        };
        let Some(first) = head.body_row else {
            return Vec::new();
        };
        let span = usize::try_from(head.rowspan).unwrap_or(1);
        self.row_ids
            .iter()
            .skip(first)
            .take(span)
            .flatten()
            .copied()
            .collect()
    }

    /// Body rows in the markup.
    pub fn body_rows(&self) -> usize {
        self.row_ids.len()
    }

    /// True if the markup contains a `pd-table`.
    pub fn has_table(&self) -> bool {
        self.has_table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const GROUPED: &str = r#"
<style type="text/css">#T_x th { color: red; }</style>
<table id="T_x" class="pd-table">
  <thead>
    <tr>
      <th class="blank">&nbsp;</th>
      <th class="blank level0">&nbsp;</th>
      <th class="pd-col-head col0" style="--pd-df-iloc: 0"><span class="pd-col-text" draggable>a</span></th>
      <th class="pd-col-head col1" style="--pd-df-iloc: 1"><span class="pd-col-text" draggable>b</span><br></th>
    </tr>
  </thead>
  <tbody>
    <tr>
      <th class="pd-row-head level0" rowspan="2" style="--pd-df-iloc: 10">x</th>
      <th class="pd-row-head level1" style="--pd-df-iloc: 10">p</th>
      <td>1</td><td>2</td>
    </tr>
    <tr>
      <th class="pd-row-head level1" style="--pd-df-iloc: 11">q</th>
      <td>3</td><td>4</td>
    </tr>
    <tr>
      <th class="pd-row-head level0" style="--pd-df-iloc: 12">y</th>
      <th class="pd-row-head level1" style="--pd-df-iloc: 12">p</th>
      <td>5</td><td>6</td>
    </tr>
  </tbody>
</table>"#;

    #[test]
    fn test_parse_headers() {
        let index = MarkupIndex::parse(GROUPED).unwrap();
        assert!(index.has_table());
        assert_eq!(index.column_ids(), vec![0, 1]);
        assert_eq!(index.body_rows(), 3);
        assert_eq!(index.heads_of(HeadKind::Row).count(), 5);
    }

    #[test]
    fn test_rowspan_groups_rows_in_display_order() {
        let index = MarkupIndex::parse(GROUPED).unwrap();
        let outer = index.heads_of(HeadKind::Row).next().unwrap();
        assert_eq!(outer.rowspan, 2);
        assert_eq!(index.row_group(outer.position), vec![10, 11]);
        let inner = index.heads_of(HeadKind::Row).nth(2).unwrap();
        assert_eq!(index.row_group(inner.position), vec![11]);
    }

    #[test]
    fn test_column_head_has_no_group() {
        let index = MarkupIndex::parse(GROUPED).unwrap();
        assert!(index.row_group(0).is_empty());
        assert!(index.row_group(99).is_empty());
    }

    #[test]
    fn test_header_without_iloc_is_skipped() {
        let html = r#"<table class="pd-table"><thead><tr>
            <th class="pd-col-head">?</th>
            <th class="pd-col-head" style="--pd-df-iloc: 3">ok</th>
        </tr></thead><tbody></tbody></table>"#;
        let index = MarkupIndex::parse(html).unwrap();
        assert_eq!(index.column_ids(), vec![3]);
        assert_eq!(index.body_rows(), 0);
    }

    /// Ids only in the stylesheet, as a pandas `Styler` renders them.
    const STYLED: &str = r#"
<style type="text/css">
#T_ab th.pd-col-0 {
  --pd-df-iloc: 0;
}
#T_ab th.pd-col-1 {
  --pd-df-iloc: 1;
}
#T_ab th.pd-row-0 {
  --pd-df-iloc: 7;
}
#T_ab th.pd-row-1 {
  --pd-df-iloc: 8;
}
</style>
<table id="T_ab" class="pd-table">
  <thead>
    <tr>
      <th class="pd-blank pd-lvl-0" >&nbsp;</th>
      <th id="T_ab_level0_col0" class="pd-col-head pd-lvl-0 pd-col-0" ><span class="pd-col-text" draggable="true">a</span></th>
      <th id="T_ab_level0_col1" class="pd-col-head pd-lvl-0 pd-col-1" ><span class="pd-col-text" draggable="true">b</span></th>
    </tr>
  </thead>
  <tbody>
    <tr>
      <th id="T_ab_level0_row0" class="pd-row-head pd-lvl-0 pd-row-0" >x</th>
      <td class="pd-data pd-row-0 pd-col-0" >1</td>
      <td class="pd-data pd-row-0 pd-col-1" >2</td>
    </tr>
    <tr>
      <th id="T_ab_level0_row1" class="pd-row-head pd-lvl-0 pd-row-1" >y</th>
      <td class="pd-data pd-row-1 pd-col-0" >3</td>
      <td class="pd-data pd-row-1 pd-col-1" >4</td>
    </tr>
  </tbody>
</table>"#;

    #[test]
    fn test_ids_from_stylesheet_rules() {
        let index = MarkupIndex::parse(STYLED).unwrap();
        assert_eq!(index.column_ids(), vec![0, 1]);
        assert_eq!(index.heads().len(), 4);
        let first_row = index.heads_of(HeadKind::Row).next().unwrap();
        assert_eq!(index.row_group(first_row.position), vec![7]);
    }

    #[test]
    fn test_inline_iloc_wins_over_stylesheet() {
        let html = r#"<style>th.pd-col-0 { --pd-df-iloc: 5; }</style>
            <table class="pd-table"><thead><tr>
            <th class="pd-col-head pd-col-0" style="--pd-df-iloc: 2">a</th>
            <th class="pd-col-head pd-col-0">b</th>
            </tr></thead><tbody></tbody></table>"#;
        let index = MarkupIndex::parse(html).unwrap();
        assert_eq!(index.column_ids(), vec![2, 5]);
    }

    #[test]
    fn test_non_table_markup_is_empty() {
        let index = MarkupIndex::parse("<div>nothing here</div>").unwrap();
        assert!(!index.has_table());
        assert!(index.heads().is_empty());
    }
}
