//! Layout configuration: padding and default colors for a [`crate::layout`]
//! call.

/// Tunables for a single [`crate::layout`] call. Construction-time only;
/// never mutated mid-layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Padding between a region's border and its children's bounding box.
    pub padding_outer: i64,
    /// Padding between adjacent rows (RowsGrid) or adjacent rectangles
    /// (PackGrid).
    pub padding_inner: i64,
    pub bg_color: u32,
    pub highlight_bg_color: u32,
    pub highlight_fg_color: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding_outer: 1,
            padding_inner: 1,
            bg_color: 0xFFFFFF,
            highlight_bg_color: 0xFFFFFF,
            highlight_fg_color: 0x000000,
        }
    }
}
