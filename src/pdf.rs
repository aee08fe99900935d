use std::path::Path;

use image::{DynamicImage, GenericImageView};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::{Error, Result};

/// Wrap a PNG into a single-page PDF. The page is the image size times
/// `scale` (points per pixel) and the image covers it from the origin.
pub fn png_to_pdf(png: &[u8], scale: f32) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(png, image::ImageFormat::Png)?;
    image_to_pdf(&img, scale)
}

pub(crate) fn image_to_pdf(img: &DynamicImage, scale: f32) -> Result<Vec<u8>> {
    let (px_width, px_height) = img.dimensions();
    if px_width == 0 || px_height == 0 {
        return Err(Error::PdfError("image has no pixels".into()));
    }
    let width = px_width as f32 * scale;
    let height = px_height as f32 * scale;

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => px_width as i64,
        "Height" => px_height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
        // Opaque screenshots carry an alpha channel too; skip the mask then.
        if alpha.iter().any(|&a| a != u8::MAX) {
            let mut mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => px_width as i64,
                    "Height" => px_height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            );
            mask.compress()?;
            let mask_id = doc.add_object(mask);
            image_dict.set("SMask", mask_id);
        }
    }

    let mut image_stream = Stream::new(image_dict, img.to_rgb8().into_raw());
    image_stream.compress()?;
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!(px_width, px_height, width, height, size = bytes.len(), "pdf built");
    Ok(bytes)
}

/// Write the PDF and check that a non-empty file landed on disk. Returns the
/// size in bytes.
pub async fn write_pdf(path: &Path, bytes: &[u8]) -> Result<u64> {
    tokio::fs::write(path, bytes).await?;
    let size = tokio::fs::metadata(path).await?.len();
    if size == 0 {
        return Err(Error::PdfError(format!("{} is empty", path.display())));
    }
    Ok(size)
}
