//! Rendering onto a mount surface.
//!
//! This module provides:
//! - The [`Surface`] trait and the state [`Flag`]s it reflects
//! - A quick-xml index of header cells in provider markup
//! - A headless surface (native) and a DOM surface (wasm32)
//! - [`Renderer`], which pushes an immutable [`ViewModel`] and the
//!   interaction overlay onto a surface

pub mod backend;
pub mod headless;
pub mod markup;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use backend::{Flag, Surface};
#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
pub use headless::{HeadlessMetrics, HeadlessSurface};
pub use markup::{HeadInfo, HeadKind, MarkupIndex};

use crate::layout::{HeightBounds, RowRange};
use crate::store::InteractionStore;

pub const VAR_PADDING_TOP: &str = "--pd-body-padding-top";
pub const VAR_PADDING_BOTTOM: &str = "--pd-body-padding-bottom";
pub const VAR_MIN_HEIGHT: &str = "--pd-view-min-height";
pub const VAR_MAX_HEIGHT: &str = "--pd-view-max-height";
pub const VAR_TD_MAX_WIDTH: &str = "--pd-body-td-max-width";

/// Class family of sort markers on column headers.
pub const SORT_FAMILY: &str = "pd-sort-";
/// Class family of selection markers on row headers.
pub const SELECT_FAMILY: &str = "pd-select-";
/// Local marker of an open filter popup.
pub const FILTER_OPEN_CLASS: &str = "pd-filter-open";

/// Immutable snapshot of everything layout-related the renderer applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub range: RowRange,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub heights: HeightBounds,
    pub view_height: f64,
    pub scroll_top: f64,
    pub scroll_left: f64,
    /// Footer line, e.g. `10000 rows × 8 columns`.
    pub footer: String,
    /// Cell width cap in characters (0 = untruncated).
    pub max_column_width: u32,
}

/// Stateless applier of view models and interaction state.
pub struct Renderer;

impl Renderer {
    /// Push padding, height bounds, scroll, footer and table flags.
    pub fn layout<S: Surface>(surface: &mut S, model: &ViewModel) {
        surface.set_style_var(VAR_PADDING_TOP, &px(model.padding_top));
        surface.set_style_var(VAR_PADDING_BOTTOM, &px(model.padding_bottom));
        surface.set_style_var(VAR_MIN_HEIGHT, &px(model.heights.min));
        surface.set_style_var(VAR_MAX_HEIGHT, &px(model.heights.max));

        let truncated = model.max_column_width != 0;
        if truncated {
            surface.set_style_var(VAR_TD_MAX_WIDTH, &format!("{}ch", model.max_column_width));
        }
        surface.set_flag(Flag::Truncated, truncated);
        let empty = surface.index().body_rows() == 0;
        surface.set_flag(Flag::Empty, empty);

        surface.set_view_height(model.view_height);
        surface.set_scroll(model.scroll_top, model.scroll_left);
        surface.set_footer(&model.footer);
    }

    /// Reflect sort, width and selection state onto header classes.
    ///
    /// A spanning row header shows the state of the first row it groups.
    pub fn interaction<S: Surface>(surface: &mut S, store: &InteractionStore) {
        let columns: Vec<_> = surface
            .index()
            .heads_of(HeadKind::Column)
            .map(|h| (h.position, store.columns().get(h.id)))
            .collect();
        for (position, state) in columns {
            let class = state.sort.map(|s| s.class_name());
            surface.set_head_class(position, SORT_FAMILY, class);
            surface.set_head_width(position, state.width);
        }

        let index = surface.index();
        let rows: Vec<_> = index
            .heads_of(HeadKind::Row)
            .map(|h| {
                let first = index.row_group(h.position).first().copied().unwrap_or(h.id);
                (h.position, store.rows().get(first))
            })
            .collect();
        for (position, state) in rows {
            let class = state.select.map(|s| s.class_name());
            surface.set_head_class(position, SELECT_FAMILY, class);
        }

        surface.set_flag(Flag::SearchActive, store.is_searching());
    }

    pub fn busy<S: Surface>(surface: &mut S, busy: bool) {
        surface.set_flag(Flag::Busy, busy);
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}
