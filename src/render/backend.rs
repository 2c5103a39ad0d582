//! Mount surface trait.
//!
//! A surface owns the concrete element tree the table is mounted into. The
//! engine never touches elements directly: it mounts markup, reads
//! measurements and pushes classes, widths and custom properties through
//! this trait.

use super::markup::MarkupIndex;
use crate::error::Result;
use crate::layout::Measurements;

/// Boolean state flags reflected as classes on the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Cell text is truncated to the width cap (on the table).
    Truncated,
    /// The mounted table has no body rows (on the table).
    Empty,
    /// A sync request is awaiting its response (on the root).
    Busy,
    /// A search query is active (on the root).
    SearchActive,
}

impl Flag {
    pub const ALL: [Flag; 4] = [Flag::Truncated, Flag::Empty, Flag::Busy, Flag::SearchActive];

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Truncated => "pd-truncated",
            Self::Empty => "pd-empty",
            Self::Busy => "pd-busy",
            Self::SearchActive => "pd-search-active",
        }
    }

    /// True if the class goes on the table element rather than the root.
    pub fn on_table(self) -> bool {
        matches!(self, Self::Truncated | Self::Empty)
    }
}

/// Element tree the view is mounted into.
///
/// Headers are addressed by their position in [`Surface::index`].
pub trait Surface {
    /// Replace the mounted content with `markup` and re-index it.
    fn mount(&mut self, markup: &str) -> Result<()>;

    /// Index of the currently mounted markup.
    fn index(&self) -> &MarkupIndex;

    /// Read pixel measurements of the mounted content.
    fn measure(&self) -> Measurements;

    /// Replace every class starting with `family` on a header with `class`.
    fn set_head_class(&mut self, position: usize, family: &str, class: Option<&str>);

    /// Flip `class` on a header; returns the new state.
    fn toggle_head_class(&mut self, position: usize, class: &str) -> bool;

    /// Pin a header to `width` pixels, or restore automatic width.
    fn set_head_width(&mut self, position: usize, width: Option<u32>);

    fn set_flag(&mut self, flag: Flag, on: bool);

    /// Set a CSS custom property on the view.
    fn set_style_var(&mut self, name: &str, value: &str);

    fn set_scroll(&mut self, top: f64, left: f64);

    fn set_view_height(&mut self, height: f64);

    fn set_footer(&mut self, text: &str);
}
