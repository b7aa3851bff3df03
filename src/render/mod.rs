//! Fixed-layout PDF rendering of an invoice.
//!
//! [`DocumentRenderer`] draws the template section by section onto a
//! [`Canvas`], using a [`LayoutEngine`] to track the vertical cursor and
//! break pages. Fonts are the standard Helvetica faces, so nothing is
//! embedded and rendering needs no files.

pub mod canvas;
pub mod fonts;
pub mod layout;
mod template;

pub use canvas::{Canvas, Color, DocumentInfo, TextRun, TextStyle};
pub use fonts::Font;
pub use layout::{Advance, LayoutEngine, PageGeometry};
pub use template::{
    DocumentRenderer, PAYMENT_BOX_HEIGHT, ROW_HEIGHT, RenderedDocument, draw_booking_details,
    draw_company_block, draw_customer_block, draw_footer, draw_header, draw_line_items,
    draw_payment_info, draw_summary,
};
