//! COCO document model for cocomerge.
//!
//! Both pipeline stages read and write the same `{images, categories,
//! annotations}` documents. The only difference between stages is how an
//! annotation refers to its image and category, which is why
//! [`Document`] is generic over the annotation type.
//!
//! # Example
//!
//! ```
//! use cocomerge::coco::{Category, CocoDocument, Image};
//!
//! let document = CocoDocument {
//!     images: vec![Image::new(5u64, "x.jpg", 640, 480)],
//!     categories: vec![Category::new(7u64, "cat")],
//!     annotations: vec![],
//! };
//! assert_eq!(document.counts(), (1, 1, 0));
//! ```

mod ids;
pub mod io_json;
mod model;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{
    bbox_from_ints, Annotation, BBox, Category, CocoDocument, Document, Image, NamedAnnotation,
    NamedDocument,
};
