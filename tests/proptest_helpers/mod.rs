#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use cocomerge::coco::{
    bbox_from_ints, Annotation, AnnotationId, Category, CategoryId, CocoDocument, Image, ImageId,
};
use proptest::collection::hash_set;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{Number, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

fn image_file_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}\\.jpg"
}

fn category_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// A raw document in which every annotation references an existing image
/// and category. Ids are sparse and unordered, file names unique.
pub fn arb_coco_document(
    max_images: usize,
    max_cats: usize,
    max_anns: usize,
) -> BoxedStrategy<CocoDocument> {
    assert!(max_images > 0, "max_images must be > 0");
    assert!(max_cats > 0, "max_cats must be > 0");

    (1usize..=max_images, 1usize..=max_cats, 0usize..=max_anns)
        .prop_flat_map(|(image_count, category_count, ann_count)| {
            (
                hash_set(0u64..10_000, image_count..=image_count),
                hash_set(image_file_name_strategy(), image_count..=image_count),
                hash_set(0u64..10_000, category_count..=category_count),
                hash_set(category_name_strategy(), category_count..=category_count),
                proptest::collection::vec(
                    (
                        0..image_count,
                        0..category_count,
                        0u8..=1,
                        (0u64..500, 0u64..500, 1u64..100, 1u64..100),
                    ),
                    ann_count..=ann_count,
                ),
            )
        })
        .prop_map(|(image_ids, file_names, category_ids, names, anns)| {
            let images: Vec<Image> = image_ids
                .into_iter()
                .zip(file_names)
                .map(|(id, file)| Image::new(id, file, 640, 480))
                .collect();
            let categories: Vec<Category> = category_ids
                .into_iter()
                .zip(names)
                .map(|(id, name)| Category::new(id, name))
                .collect();

            let annotations = anns
                .into_iter()
                .enumerate()
                .map(|(idx, (image_idx, category_idx, iscrowd, (x, y, w, h)))| Annotation {
                    segmentation: Value::Array(vec![]),
                    iscrowd,
                    area: Number::from(w * h),
                    image_id: Some(images[image_idx].id),
                    bbox: bbox_from_ints(x, y, w, h),
                    category_id: Some(categories[category_idx].id),
                    id: AnnotationId::new(idx as u64 + 1),
                })
                .collect();

            CocoDocument {
                images,
                categories,
                annotations,
            }
        })
        .boxed()
}

/// Several raw documents, as produced by labeling one image per file.
pub fn arb_coco_documents(max_docs: usize) -> BoxedStrategy<Vec<CocoDocument>> {
    proptest::collection::vec(arb_coco_document(3, 4, 6), 1..=max_docs).boxed()
}

/// Maps each annotation id to the `(file_name, category_name)` it points at.
pub fn annotation_targets(
    document: &CocoDocument,
) -> Result<BTreeMap<AnnotationId, (String, String)>, String> {
    let image_by_id: HashMap<ImageId, &str> = document
        .images
        .iter()
        .map(|img| (img.id, img.file_name.as_str()))
        .collect();
    let category_by_id: HashMap<CategoryId, &str> = document
        .categories
        .iter()
        .map(|cat| (cat.id, cat.name.as_str()))
        .collect();

    let mut out = BTreeMap::new();
    for ann in &document.annotations {
        let image = ann
            .image_id
            .and_then(|id| image_by_id.get(&id))
            .ok_or_else(|| format!("annotation {} has no resolvable image", ann.id))?;
        let category = ann
            .category_id
            .and_then(|id| category_by_id.get(&id))
            .ok_or_else(|| format!("annotation {} has no resolvable category", ann.id))?;
        out.insert(ann.id, (image.to_string(), category.to_string()));
    }
    Ok(out)
}
