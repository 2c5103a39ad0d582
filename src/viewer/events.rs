//! Event routing.
//!
//! Raw user events arrive as an element path (innermost first) and are
//! turned into typed [`Action`]s against the mounted [`MarkupIndex`]. Routing
//! is pure; applying an action to the interaction store is a separate step.

use crate::render::markup::{
    MarkupIndex, COL_HEAD_CLASS, COL_TEXT_CLASS, FILTER_ICON_CLASS, ROW_HEAD_CLASS, SEARCH_CLASS,
    VIEW_CLASS,
};
use crate::render::HeadKind;
use crate::store::InteractionStore;
use crate::sync::EventKind;
use crate::types::{ColumnId, RowId};

/// Widths closer than this to the mounted width are not a resize.
const WIDTH_TOLERANCE_PX: f64 = 1.0;

/// One element on an event path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementInfo {
    pub classes: Vec<String>,
    /// Position in the markup index if the element is a header cell.
    pub head: Option<usize>,
    /// Current rendered width (header cells only).
    pub width: Option<f64>,
    /// Width right after mount (header cells only).
    pub natural_width: Option<f64>,
}

impl ElementInfo {
    pub fn new(classes: &[&str]) -> Self {
        Self {
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Header cell at `position`.
    pub fn head(position: usize, classes: &[&str]) -> Self {
        Self {
            head: Some(position),
            ..Self::new(classes)
        }
    }

    pub fn with_widths(mut self, width: f64, natural_width: f64) -> Self {
        self.width = Some(width);
        self.natural_width = Some(natural_width);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Width in whole pixels if the user resized this element since mount.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn resized_width(&self) -> Option<u32> {
        let (width, natural) = (self.width?, self.natural_width?);
        if (width - natural).abs() < WIDTH_TOLERANCE_PX || width <= 0.0 {
            return None;
        }
        Some(width.round() as u32)
    }
}

/// Typed user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ToggleSort(ColumnId),
    ToggleSelect(Vec<RowId>),
    SetWidth(ColumnId, u32),
    Reorder(Vec<ColumnId>),
    Search(String),
    /// Flip the local filter popup marker on the header at this position.
    OpenFilter(usize),
    /// The scroll region itself was resized.
    ResizeView,
}

impl Action {
    /// Mutate `store`; returns the sync event to push, `None` for actions
    /// that never touch interaction state.
    pub fn apply(&self, store: &mut InteractionStore) -> Option<EventKind> {
        match self {
            Self::ToggleSort(column) => {
                store.toggle_sort(*column);
                Some(EventKind::Sort)
            }
            Self::ToggleSelect(group) if group.is_empty() => None,
            Self::ToggleSelect(group) => {
                store.toggle_select(group);
                Some(EventKind::Select)
            }
            Self::SetWidth(column, width) => {
                store.set_width(*column, *width);
                Some(EventKind::Resize)
            }
            Self::Reorder(sequence) => {
                store.reorder(sequence.clone());
                Some(EventKind::Reorder)
            }
            Self::Search(query) => {
                store.set_search_query(query);
                Some(EventKind::Search)
            }
            Self::OpenFilter(_) | Self::ResizeView => None,
        }
    }
}

/// Outcome of routing one click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickRoute {
    /// Width captured from a resized column header. Always evaluated.
    pub width: Option<Action>,
    /// The single action taken by the closest matching ancestor.
    pub action: Option<Action>,
}

fn closest_head<'a>(
    path: &'a [ElementInfo],
    index: &MarkupIndex,
    kind: HeadKind,
) -> Option<(&'a ElementInfo, u32)> {
    path.iter().find_map(|el| {
        let head = index.head(el.head?)?;
        (head.kind == kind).then_some((el, head.id))
    })
}

/// Route a click.
///
/// Width capture runs first and independently. Then exactly one of filter
/// popup, sort toggle, selection toggle or view resize fires, picked by the
/// innermost element that matches. A click on a header the user just resized
/// counts as the resize and does not also sort.
pub fn route_click(path: &[ElementInfo], index: &MarkupIndex) -> ClickRoute {
    let mut route = ClickRoute::default();

    if let Some((el, column)) = closest_head(path, index, HeadKind::Column) {
        route.width = el.resized_width().map(|w| Action::SetWidth(column, w));
    }

    if path.first().is_some_and(|el| el.has_class(VIEW_CLASS)) {
        route.action = Some(Action::ResizeView);
        return route;
    }

    for el in path {
        if el.has_class(FILTER_ICON_CLASS) {
            route.action = path
                .iter()
                .find(|e| e.has_class(COL_HEAD_CLASS))
                .and_then(|e| e.head)
                .map(Action::OpenFilter);
            break;
        }
        if el.has_class(COL_HEAD_CLASS) {
            if route.width.is_none() {
                route.action = el
                    .head
                    .and_then(|p| index.head(p))
                    .map(|h| Action::ToggleSort(h.id));
            }
            break;
        }
        if el.has_class(ROW_HEAD_CLASS) {
            route.action = el
                .head
                .map(|p| Action::ToggleSelect(index.row_group(p)));
            break;
        }
    }
    route
}

/// Column picked up by a drag, if it started on a header label.
pub fn route_drag_start(path: &[ElementInfo], index: &MarkupIndex) -> Option<ColumnId> {
    if !path.iter().any(|el| el.has_class(COL_TEXT_CLASS)) {
        return None;
    }
    closest_head(path, index, HeadKind::Column).map(|(_, id)| id)
}

/// Reorder produced by dropping `dragged` onto the header under `path`.
///
/// The two columns swap places; dropping onto itself or outside a column
/// header does nothing.
pub fn route_drop(
    path: &[ElementInfo],
    index: &MarkupIndex,
    dragged: ColumnId,
    store: &InteractionStore,
) -> Option<Action> {
    let (_, target) = closest_head(path, index, HeadKind::Column)?;
    store.swapped_order(dragged, target).map(Action::Reorder)
}

/// Search submitted with Enter in the search input.
pub fn route_key(key: &str, path: &[ElementInfo], value: &str) -> Option<Action> {
    if key != "Enter" {
        return None;
    }
    path.first()
        .filter(|el| el.has_class(SEARCH_CLASS))
        .map(|_| Action::Search(value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<table class="pd-table"><thead><tr>
        <th class="pd-col-head" style="--pd-df-iloc: 0"><span class="pd-col-text">a</span><span class="pd-col-i-filter"></span></th>
        <th class="pd-col-head" style="--pd-df-iloc: 1"><span class="pd-col-text">b</span></th>
        </tr></thead><tbody>
        <tr><th class="pd-row-head" rowspan="2" style="--pd-df-iloc: 7">g</th>
            <th class="pd-row-head" style="--pd-df-iloc: 7">7</th><td>1</td><td>2</td></tr>
        <tr><th class="pd-row-head" style="--pd-df-iloc: 8">8</th><td>3</td><td>4</td></tr>
        </tbody></table>"#;

    fn index() -> MarkupIndex {
        MarkupIndex::parse(TABLE).unwrap()
    }

    fn view() -> ElementInfo {
        ElementInfo::new(&["pd-view"])
    }

    fn col_head(position: usize) -> ElementInfo {
        ElementInfo::head(position, &["pd-col-head"]).with_widths(80.0, 80.0)
    }

    #[test]
    fn test_click_on_label_sorts() {
        let path = [ElementInfo::new(&["pd-col-text"]), col_head(1), view()];
        let route = route_click(&path, &index());
        assert_eq!(route.action, Some(Action::ToggleSort(1)));
        assert_eq!(route.width, None);
    }

    #[test]
    fn test_filter_icon_wins_over_sort() {
        let path = [ElementInfo::new(&["pd-col-i-filter"]), col_head(0), view()];
        let route = route_click(&path, &index());
        assert_eq!(route.action, Some(Action::OpenFilter(0)));
    }

    #[test]
    fn test_resized_header_captures_width_without_sorting() {
        let head = ElementInfo::head(0, &["pd-col-head"]).with_widths(131.6, 80.0);
        let route = route_click(&[head, view()], &index());
        assert_eq!(route.width, Some(Action::SetWidth(0, 132)));
        assert_eq!(route.action, None);
    }

    #[test]
    fn test_row_head_selects_group() {
        let path = [ElementInfo::head(2, &["pd-row-head"]), view()];
        let route = route_click(&path, &index());
        assert_eq!(route.action, Some(Action::ToggleSelect(vec![7, 8])));
    }

    #[test]
    fn test_click_on_view_itself_is_resize() {
        let route = route_click(&[view()], &index());
        assert_eq!(route.action, Some(Action::ResizeView));
    }

    #[test]
    fn test_click_on_cell_does_nothing() {
        let path = [ElementInfo::new(&[]), ElementInfo::new(&["pd-table"]), view()];
        assert_eq!(route_click(&path, &index()), ClickRoute::default());
    }

    #[test]
    fn test_drag_and_drop_swaps() {
        let index = index();
        let mut store = InteractionStore::new();
        store.ensure_order(index.column_ids());

        let start = [ElementInfo::new(&["pd-col-text"]), col_head(0)];
        let dragged = route_drag_start(&start, &index).unwrap();
        assert_eq!(dragged, 0);

        let target = [ElementInfo::new(&["pd-col-text"]), col_head(1)];
        let action = route_drop(&target, &index, dragged, &store);
        assert_eq!(action, Some(Action::Reorder(vec![1, 0])));
        assert_eq!(route_drop(&start, &index, dragged, &store), None);
    }

    #[test]
    fn test_drag_outside_label_is_ignored() {
        assert_eq!(route_drag_start(&[col_head(0)], &index()), None);
    }

    #[test]
    fn test_enter_in_search_submits() {
        let input = [ElementInfo::new(&["pd-search"])];
        assert_eq!(
            route_key("Enter", &input, "  abc"),
            Some(Action::Search("  abc".into()))
        );
        assert_eq!(route_key("a", &input, "abc"), None);
        assert_eq!(route_key("Enter", &[view()], "abc"), None);
    }

    #[test]
    fn test_apply_reports_event_kind() {
        let mut store = InteractionStore::new();
        assert_eq!(Action::ToggleSort(3).apply(&mut store), Some(EventKind::Sort));
        assert_eq!(Action::ToggleSelect(vec![]).apply(&mut store), None);
        assert_eq!(Action::OpenFilter(0).apply(&mut store), None);
        assert_eq!(
            Action::Search(" q ".into()).apply(&mut store),
            Some(EventKind::Search)
        );
        assert_eq!(store.search_query(), "q");
    }
}
