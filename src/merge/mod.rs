//! Merging name-resolved documents into one COCO dataset.
//!
//! Every input file numbers its images, categories and annotations from
//! scratch, so the merger hands out fresh ids:
//!
//! - images get dense ids from 0 in encounter order. Images are never
//!   deduplicated, even when a file name repeats.
//! - categories get dense ids from 0, one per distinct name, in first-seen
//!   order. Later categories with a known name are dropped.
//! - annotations get dense ids from 1 in encounter order.
//!
//! Annotations are then re-keyed by looking up their `image_name` and
//! `category_name` among everything merged so far. When several merged
//! images share a file name, the most recently merged one wins.
//!
//! All state lives in one [`Merger`] that is scoped to a single run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::coco::io_json::{read_document, write_document, JsonLayout};
use crate::coco::{
    Annotation, AnnotationId, Category, CategoryId, CocoDocument, Image, ImageId,
    NamedAnnotation, NamedDocument,
};
use crate::error::CocoMergeError;
use crate::policy::ReferencePolicy;
use crate::report::{RunCounts, RunIssue, RunIssueCode, RunReport};

/// Default file name of the merged dataset.
pub const DEFAULT_OUTPUT: &str = "trainval.json";

const STAGE: &str = "merge";

/// Options for the merge stage.
#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    pub policy: ReferencePolicy,
}

/// The merged dataset plus the run report.
#[derive(Clone, Debug)]
pub struct Merged {
    pub document: CocoDocument,
    pub report: RunReport,
}

/// Accumulator for one merge run.
///
/// Lists only ever grow; an id, once handed out, is never reassigned.
#[derive(Debug)]
pub struct Merger {
    options: MergeOptions,
    images: Vec<Image>,
    categories: Vec<Category>,
    annotations: Vec<Annotation>,
    image_ids: HashMap<String, ImageId>,
    category_ids: HashMap<String, CategoryId>,
    next_image_id: ImageId,
    next_annotation_id: AnnotationId,
    crowd_resets: usize,
    report: RunReport,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            options,
            images: Vec::new(),
            categories: Vec::new(),
            annotations: Vec::new(),
            image_ids: HashMap::new(),
            category_ids: HashMap::new(),
            next_image_id: ImageId(0),
            next_annotation_id: AnnotationId(1),
            crowd_resets: 0,
            report: RunReport::new(STAGE),
        }
    }

    /// Appends one document: images, then categories, then annotations.
    ///
    /// # Errors
    /// Under [`ReferencePolicy::Strict`], fails on the first annotation
    /// whose image or category name is unknown. The merger must not be
    /// used after an error.
    pub fn push(&mut self, document: NamedDocument) -> Result<(), CocoMergeError> {
        self.report.files += 1;
        self.report.input += RunCounts::from_tuple(document.counts());

        for image in document.images {
            self.push_image(image);
        }
        for category in document.categories {
            self.push_category(category);
        }
        for annotation in document.annotations {
            self.push_annotation(annotation)?;
        }
        Ok(())
    }

    fn push_image(&mut self, image: Image) {
        let id = self.next_image_id;
        self.next_image_id = id.next();

        if self.image_ids.insert(image.file_name.clone(), id).is_some() {
            self.report.add(RunIssue::warning(
                RunIssueCode::DuplicateFileName,
                format!(
                    "file name '{}' merged more than once; later annotations bind to image {}",
                    image.file_name, id
                ),
            ));
        }

        self.images.push(image.renumbered(id));
    }

    fn push_category(&mut self, category: Category) {
        if self.category_ids.contains_key(&category.name) {
            self.report.add(RunIssue::info(
                RunIssueCode::DuplicateCategory,
                format!("category '{}' already merged; dropped", category.name),
            ));
            return;
        }

        let id = CategoryId(self.categories.len() as u64);
        self.category_ids.insert(category.name.clone(), id);
        self.categories.push(Category::flat(id, category.name));
    }

    fn push_annotation(&mut self, annotation: NamedAnnotation) -> Result<(), CocoMergeError> {
        let id = self.next_annotation_id;
        let policy = self.options.policy;

        let image_id = policy.settle(
            annotation
                .image_name
                .as_ref()
                .and_then(|name| self.image_ids.get(name).copied()),
            STAGE,
            annotation.id.as_u64(),
            RunIssueCode::UnresolvedImage,
            || describe("image", annotation.image_name.as_deref()),
            &mut self.report,
        )?;

        let category_id = policy.settle(
            annotation
                .category_name
                .as_ref()
                .and_then(|name| self.category_ids.get(name).copied()),
            STAGE,
            annotation.id.as_u64(),
            RunIssueCode::UnresolvedCategory,
            || describe("category", annotation.category_name.as_deref()),
            &mut self.report,
        )?;

        if annotation.iscrowd != 0 {
            self.crowd_resets += 1;
        }

        self.annotations.push(Annotation {
            segmentation: annotation.segmentation,
            iscrowd: 0,
            area: annotation.area,
            image_id,
            bbox: annotation.bbox,
            category_id,
            id,
        });
        self.next_annotation_id = id.next();
        Ok(())
    }

    /// Ends the run and hands back the merged document.
    pub fn finish(mut self) -> Merged {
        if self.crowd_resets > 0 {
            self.report.add(RunIssue::info(
                RunIssueCode::CrowdFlagReset,
                format!("{} annotation(s) had iscrowd reset to 0", self.crowd_resets),
            ));
        }

        let document = CocoDocument {
            images: self.images,
            categories: self.categories,
            annotations: self.annotations,
        };
        self.report.output = RunCounts::from_tuple(document.counts());

        Merged {
            document,
            report: self.report,
        }
    }
}

fn describe(kind: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{kind} '{name}'"),
        None => format!("{kind} (no {kind}_name)"),
    }
}

/// Merges documents in order.
pub fn merge_documents<I>(documents: I, options: &MergeOptions) -> Result<Merged, CocoMergeError>
where
    I: IntoIterator<Item = NamedDocument>,
{
    let mut merger = Merger::new(options.clone());
    for document in documents {
        merger.push(document)?;
    }
    Ok(merger.finish())
}

/// Reads every input, merges them and writes the result compactly to
/// `output`.
///
/// Nothing is written unless every input reads and merges cleanly.
pub fn merge_files(
    inputs: &[PathBuf],
    output: &Path,
    options: &MergeOptions,
) -> Result<RunReport, CocoMergeError> {
    let mut merger = Merger::new(options.clone());
    for input in inputs {
        log::debug!("merging {}", input.display());
        let document: NamedDocument = read_document(input)?;
        merger.push(document)?;
    }

    let merged = merger.finish();
    write_document(output, &merged.document, JsonLayout::Compact)?;
    log::info!(
        "merged {} file(s) into {}: {} images, {} categories, {} annotations",
        merged.report.files,
        output.display(),
        merged.report.output.images,
        merged.report.output.categories,
        merged.report.output.annotations
    );

    Ok(merged.report)
}
