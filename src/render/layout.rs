//! Vertical cursor bookkeeping for the fixed invoice template.
//!
//! The engine never draws. It tracks where the next row goes and decides
//! when a page is full; the renderer reacts to [`Advance::NewPage`] by
//! starting a page on the canvas and redrawing repeating headers.

/// Page size and the fixed vertical bands of the template, in points,
/// measured from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Left and right margin.
    pub margin: f64,
    /// Cursor position at the top of a fresh page.
    pub top: f64,
    /// Content must end at or above this line; below it is the footer band.
    pub content_limit: f64,
    /// Distance of the footer rule from the bottom edge.
    pub footer_offset: f64,
}

impl PageGeometry {
    /// A4 portrait with 50 pt margins.
    pub const fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 50.0,
            top: 50.0,
            content_limit: 750.0,
            footer_offset: 80.0,
        }
    }

    pub fn left(&self) -> f64 {
        self.margin
    }

    pub fn right(&self) -> f64 {
        self.width - self.margin
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Top of the footer band.
    pub fn footer_top(&self) -> f64 {
        self.height - self.footer_offset
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// x offsets of the four line-item table columns.
pub mod table_columns {
    pub const DESCRIPTION: f64 = 60.0;
    pub const QUANTITY: f64 = 320.0;
    pub const UNIT_PRICE: f64 = 420.0;
    pub const TOTAL: f64 = 490.0;
    /// Wrap width of the description column.
    pub const DESCRIPTION_WIDTH: f64 = 250.0;
    /// x of summary labels (subtotal, tax).
    pub const SUMMARY_LABEL: f64 = 380.0;
}

/// x offsets of the label/value grid in the booking-details box.
pub mod detail_columns {
    pub const LEFT_LABEL: f64 = 70.0;
    pub const LEFT_VALUE: f64 = 200.0;
    pub const RIGHT_LABEL: f64 = 350.0;
    pub const RIGHT_VALUE: f64 = 480.0;
}

/// x offsets of the two address blocks.
pub mod info_columns {
    pub const COMPANY: f64 = 50.0;
    pub const CUSTOMER: f64 = 320.0;
}

/// Result of moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    SamePage,
    /// A page break happened; the cursor is at the top of the new page.
    NewPage,
}

/// Top-down cursor over a sequence of pages of identical geometry.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    y: f64,
    page: usize,
}

impl LayoutEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.top,
            page: 0,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Current cursor position.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Zero-based index of the current page.
    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Jump to a fixed template anchor on the current page.
    pub fn move_to(&mut self, y: f64) {
        self.y = y;
    }

    /// Move down by `row_height`. If the cursor would land in the footer
    /// band, break the page instead and put the cursor at the top.
    pub fn advance(&mut self, row_height: f64) -> Advance {
        let next = self.y + row_height;
        if next > self.geometry.content_limit {
            self.break_page();
            Advance::NewPage
        } else {
            self.y = next;
            Advance::SamePage
        }
    }

    /// Break the page first if a block of `height` starting at the cursor
    /// would reach into the footer band.
    pub fn ensure_space(&mut self, height: f64) -> Advance {
        if self.fits(height) {
            Advance::SamePage
        } else {
            self.break_page();
            Advance::NewPage
        }
    }

    /// Whether a block of `height` fits below the cursor on this page.
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.geometry.content_limit
    }

    fn break_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.top;
    }
}
