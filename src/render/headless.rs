//! In-memory surface.
//!
//! Mounts markup into a [`MarkupIndex`] and records everything the engine
//! applies, with pixel sizes taken from a fixed [`HeadlessMetrics`]. Used for
//! native embedding and throughout the tests.

use std::collections::{BTreeMap, BTreeSet};

use super::backend::{Flag, Surface};
use super::markup::MarkupIndex;
use crate::error::Result;
use crate::layout::Measurements;

/// Fixed pixel sizes reported by a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessMetrics {
    pub row_height: f64,
    pub header_height: f64,
    pub scrollbar_height: f64,
    pub screen_height: f64,
}

impl Default for HeadlessMetrics {
    fn default() -> Self {
        Self {
            row_height: 24.0,
            header_height: 30.0,
            scrollbar_height: 0.0,
            screen_height: 960.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    metrics: HeadlessMetrics,
    index: MarkupIndex,
    markup: String,
    head_classes: Vec<BTreeSet<String>>,
    head_widths: Vec<Option<u32>>,
    flags: BTreeSet<Flag>,
    vars: BTreeMap<String, String>,
    scroll: (f64, f64),
    view_height: f64,
    footer: String,
    mounts: usize,
}

impl HeadlessSurface {
    pub fn new(metrics: HeadlessMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    pub fn metrics(&self) -> &HeadlessMetrics {
        &self.metrics
    }

    /// Simulate a user resizing the scroll region.
    pub fn resize_to(&mut self, height: f64) {
        self.view_height = height;
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Times markup has been mounted.
    pub fn mounts(&self) -> usize {
        self.mounts
    }

    pub fn head_classes(&self, position: usize) -> Vec<&str> {
        self.head_classes
            .get(position)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn head_has_class(&self, position: usize, class: &str) -> bool {
        self.head_classes
            .get(position)
            .is_some_and(|set| set.contains(class))
    }

    pub fn head_width(&self, position: usize) -> Option<u32> {
        self.head_widths.get(position).copied().flatten()
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn style_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn scroll(&self) -> (f64, f64) {
        self.scroll
    }

    pub fn view_height(&self) -> f64 {
        self.view_height
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}

impl Surface for HeadlessSurface {
    fn mount(&mut self, markup: &str) -> Result<()> {
        self.index = MarkupIndex::parse(markup)?;
        markup.clone_into(&mut self.markup);
        self.head_classes = self
            .index
            .heads()
            .iter()
            .map(|h| h.classes.iter().cloned().collect())
            .collect();
        self.head_widths = vec![None; self.index.heads().len()];
        self.flags.retain(|f| !f.on_table());
        self.mounts += 1;
        Ok(())
    }

    fn index(&self) -> &MarkupIndex {
        &self.index
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure(&self) -> Measurements {
        let body_rows = self.index.body_rows();
        let row_height = if body_rows == 0 {
            0.0
        } else {
            self.metrics.row_height
        };
        let header_height = if self.index.has_table() {
            self.metrics.header_height
        } else {
            0.0
        };
        Measurements {
            row_height,
            header_height,
            table_outer_height: header_height + body_rows as f64 * row_height,
            scrollbar_height: self.metrics.scrollbar_height,
            view_height: self.view_height,
            screen_height: self.metrics.screen_height,
        }
    }

    fn set_head_class(&mut self, position: usize, family: &str, class: Option<&str>) {
        if let Some(set) = self.head_classes.get_mut(position) {
            set.retain(|c| !c.starts_with(family));
            if let Some(class) = class {
                set.insert(class.to_string());
            }
        }
    }

    fn toggle_head_class(&mut self, position: usize, class: &str) -> bool {
        let Some(set) = self.head_classes.get_mut(position) else {
            return false;
        };
        if set.remove(class) {
            false
        } else {
            set.insert(class.to_string());
            true
        }
    }

    fn set_head_width(&mut self, position: usize, width: Option<u32>) {
        if let Some(slot) = self.head_widths.get_mut(position) {
            *slot = width;
        }
    }

    fn set_flag(&mut self, flag: Flag, on: bool) {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    fn set_style_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    fn set_scroll(&mut self, top: f64, left: f64) {
        self.scroll = (top, left);
    }

    fn set_view_height(&mut self, height: f64) {
        self.view_height = height;
    }

    fn set_footer(&mut self, text: &str) {
        text.clone_into(&mut self.footer);
    }
}
