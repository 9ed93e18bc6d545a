//! Record model shared by the resolver and the merger.
//!
//! A [`Document`] is the top-level `{images, categories, annotations}`
//! container. The annotation type is a parameter because the two stages
//! disagree on how an annotation points at its image and category:
//! [`Annotation`] uses integer foreign keys (plain COCO), while
//! [`NamedAnnotation`] carries the image file name and category name.
//!
//! Field declaration order is the serialized field order, so output is
//! stable across runs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use super::ids::{AnnotationId, CategoryId, ImageId};

/// Bounding box as written by the labeling tool: `[x, y, width, height]`.
///
/// Numbers are kept as JSON numbers so integer boxes stay integers.
pub type BBox = [Number; 4];

/// A document whose annotations use integer foreign keys.
pub type CocoDocument = Document<Annotation>;

/// A document whose annotations reference images and categories by name.
pub type NamedDocument = Document<NamedAnnotation>;

/// Top-level container of images, categories and annotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document<A> {
    pub images: Vec<Image>,
    pub categories: Vec<Category>,
    pub annotations: Vec<A>,
}

impl<A> Default for Document<A> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            categories: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

impl<A> Document<A> {
    /// Returns `(images, categories, annotations)` counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.images.len(),
            self.categories.len(),
            self.annotations.len(),
        )
    }
}

/// An image entry.
///
/// Dimensions stay JSON numbers: some labeling tools write `480.0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub height: Number,
    pub width: Number,
    pub id: ImageId,
    pub file_name: String,

    /// Fields the labeling tool wrote that this crate does not interpret.
    /// Passed through by the resolver, dropped by the merger.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            height: Number::from(height),
            width: Number::from(width),
            id: id.into(),
            file_name: file_name.into(),
            extra: Map::new(),
        }
    }

    /// Same file name and dimensions under a new id, without extra fields.
    pub fn renumbered(self, id: ImageId) -> Self {
        Self {
            height: self.height,
            width: self.width,
            id,
            file_name: self.file_name,
            extra: Map::new(),
        }
    }
}

/// A category entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// `None` only when the key is absent; an explicit `null` is kept.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub supercategory: Option<Value>,
    pub id: CategoryId,
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            supercategory: None,
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// A flat category whose supercategory repeats its own name.
    ///
    /// Downstream COCO consumers expect `supercategory` to be present.
    pub fn flat(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            supercategory: Some(Value::String(name.clone())),
            id: id.into(),
            name,
            extra: Map::new(),
        }
    }

    /// The supercategory, when it is a string.
    pub fn supercategory_name(&self) -> Option<&str> {
        self.supercategory.as_ref().and_then(Value::as_str)
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A COCO annotation keyed by integer image and category ids.
///
/// The foreign keys are optional: the merger leaves them out when the
/// referenced image or category could not be found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Polygon list or RLE mask, never interpreted.
    pub segmentation: Value,
    pub iscrowd: u8,
    pub area: Number,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,

    pub bbox: BBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    pub id: AnnotationId,
}

/// An annotation whose references have been replaced by names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedAnnotation {
    pub segmentation: Value,
    pub iscrowd: u8,
    pub area: Number,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    pub bbox: BBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    pub id: AnnotationId,
}

/// Builds a bbox from integer components.
pub fn bbox_from_ints(x: u64, y: u64, w: u64, h: u64) -> BBox {
    [Number::from(x), Number::from(y), Number::from(w), Number::from(h)]
}
