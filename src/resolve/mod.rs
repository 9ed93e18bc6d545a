//! Name resolution: replace integer foreign keys with names.
//!
//! A raw per-image document says `"image_id": 5, "category_id": 7`. Ids
//! are only meaningful inside that one file, so before files can be
//! merged every annotation is rewritten to point at its image by
//! `file_name` and at its category by `name`. Images and categories are
//! passed through untouched.
//!
//! Each file is resolved on its own; nothing carries over between files.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::coco::io_json::{read_document, write_document, JsonLayout};
use crate::coco::{
    Annotation, CategoryId, CocoDocument, ImageId, NamedAnnotation, NamedDocument,
};
use crate::error::CocoMergeError;
use crate::policy::ReferencePolicy;
use crate::report::{RunCounts, RunIssueCode, RunReport};

/// Suffix appended to an input path to name its resolved output.
pub const RESOLVED_SUFFIX: &str = "1";

/// Extension of raw annotation files.
pub const RAW_EXTENSION: &str = "json";

/// Extension of resolved files (`json` + [`RESOLVED_SUFFIX`]).
pub const RESOLVED_EXTENSION: &str = "json1";

const STAGE: &str = "resolve";

/// Options for the resolve stage.
#[derive(Clone, Debug, Default)]
pub struct ResolveOptions {
    pub policy: ReferencePolicy,
}

/// A resolved document and what happened while resolving it.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub document: NamedDocument,
    pub report: RunReport,
}

/// Id-to-name lookup tables for one document.
///
/// When an id appears more than once, the entry that comes last in the
/// document wins.
#[derive(Clone, Debug, Default)]
pub struct NameIndex<'a> {
    images: HashMap<ImageId, &'a str>,
    categories: HashMap<CategoryId, &'a str>,
}

impl<'a> NameIndex<'a> {
    pub fn from_document(document: &'a CocoDocument) -> Self {
        let images = document
            .images
            .iter()
            .map(|img| (img.id, img.file_name.as_str()))
            .collect();
        let categories = document
            .categories
            .iter()
            .map(|cat| (cat.id, cat.name.as_str()))
            .collect();
        Self { images, categories }
    }

    pub fn image_name(&self, id: ImageId) -> Option<&'a str> {
        self.images.get(&id).copied()
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&'a str> {
        self.categories.get(&id).copied()
    }
}

/// Resolves every annotation of `document` to name references.
///
/// # Errors
/// Under [`ReferencePolicy::Strict`], returns
/// [`CocoMergeError::UnresolvedReference`] for the first annotation whose
/// image or category id is unknown.
pub fn resolve_document(
    document: &CocoDocument,
    options: &ResolveOptions,
) -> Result<Resolved, CocoMergeError> {
    let index = NameIndex::from_document(document);
    let mut report = RunReport::new(STAGE);
    report.files = 1;
    report.input = RunCounts::from_tuple(document.counts());

    let annotations = document
        .annotations
        .iter()
        .map(|ann| resolve_annotation(ann, &index, options.policy, &mut report))
        .collect::<Result<Vec<_>, _>>()?;

    let resolved = NamedDocument {
        images: document.images.clone(),
        categories: document.categories.clone(),
        annotations,
    };
    report.output = RunCounts::from_tuple(resolved.counts());

    Ok(Resolved {
        document: resolved,
        report,
    })
}

fn resolve_annotation(
    ann: &Annotation,
    index: &NameIndex<'_>,
    policy: ReferencePolicy,
    report: &mut RunReport,
) -> Result<NamedAnnotation, CocoMergeError> {
    let id = ann.id.as_u64();

    let image_name = match ann.image_id {
        Some(image_id) => policy.settle(
            index.image_name(image_id),
            STAGE,
            id,
            RunIssueCode::UnresolvedImage,
            || format!("image id {image_id}"),
            report,
        )?,
        None => policy.settle(
            None,
            STAGE,
            id,
            RunIssueCode::UnresolvedImage,
            || "image (no image_id)".to_string(),
            report,
        )?,
    };

    let category_name = match ann.category_id {
        Some(category_id) => policy.settle(
            index.category_name(category_id),
            STAGE,
            id,
            RunIssueCode::UnresolvedCategory,
            || format!("category id {category_id}"),
            report,
        )?,
        None => policy.settle(
            None,
            STAGE,
            id,
            RunIssueCode::UnresolvedCategory,
            || "category (no category_id)".to_string(),
            report,
        )?,
    };

    Ok(NamedAnnotation {
        segmentation: ann.segmentation.clone(),
        iscrowd: ann.iscrowd,
        area: ann.area.clone(),
        image_name: image_name.map(str::to_owned),
        bbox: ann.bbox.clone(),
        category_name: category_name.map(str::to_owned),
        id: ann.id,
    })
}

/// Path the resolved form of `input` is written to: the input path with
/// [`RESOLVED_SUFFIX`] appended (`a.json` becomes `a.json1`).
pub fn resolved_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(RESOLVED_SUFFIX);
    PathBuf::from(name)
}

/// Reads `input`, resolves it and writes the result next to it.
///
/// Returns the output path and the run report for this file.
pub fn resolve_file(
    input: &Path,
    options: &ResolveOptions,
) -> Result<(PathBuf, RunReport), CocoMergeError> {
    let document: CocoDocument = read_document(input)?;
    let resolved = resolve_document(&document, options)?;

    let output = resolved_path(input);
    write_document(&output, &resolved.document, JsonLayout::Pretty)?;
    log::debug!("resolved {} -> {}", input.display(), output.display());

    Ok((output, resolved.report))
}

/// Resolves each file in turn, stopping at the first failure.
pub fn resolve_files(
    inputs: &[PathBuf],
    options: &ResolveOptions,
) -> Result<RunReport, CocoMergeError> {
    let mut total = RunReport::new(STAGE);
    for input in inputs {
        let (_, report) = resolve_file(input, options)?;
        total.absorb(report);
    }
    log::info!(
        "resolved {} file(s), {} annotation(s)",
        total.files,
        total.output.annotations
    );
    Ok(total)
}
