//! Read-only interface onto the document collaborator that owns page
//! content, geometry and annotations.
//!
//! The analysis core never parses content streams itself; everything it
//! needs about page content comes through this trait. Implementors are
//! expected to memoize: repeated queries for the same page/identifier must
//! be cheap after the first call.

use crate::{ObjectId, PageNumber};

/// Axis-aligned bounding box in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }
}

/// Geometry/text lookups provided by the document-model collaborator.
pub trait DocumentServices {
    /// Page an object (e.g. an annotation) appears on, if any.
    fn page_number_for(&self, object: ObjectId) -> Option<PageNumber>;

    /// Bounding box of one marked-content run.
    fn marked_content_bounds(&self, page: PageNumber, mcid: u32) -> Option<Rect>;

    /// Extracted text of one marked-content run.
    fn marked_content_text(&self, page: PageNumber, mcid: u32) -> Option<String>;

    /// Bounding box of an annotation object.
    fn annotation_bounds(&self, object: ObjectId) -> Option<Rect>;
}
