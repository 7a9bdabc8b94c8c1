//! Media resolver: download the candidate's file, read its size, re-upload it.

use serde::Serialize;
use std::io::Cursor;
use tracing::{error, info, warn};

use crate::contract::{ContentStore, NewMediaUpload, Transport};
use crate::error::{PickError, Result};
use crate::select::{Candidate, ContentKind};

/// A stored media file ready to be shown in the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    pub content_uri: String,
    pub mime_type: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_px: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_px: Option<u32>,
}

/// Pixel width and height read from the image header, if the format is one we can decode.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "Could not read media dimensions");
            None
        }
    }
}

pub fn upload_filename(label: &str, extension: &str) -> String {
    format!("{label}.{extension}")
}

/// Download, measure and upload the media of an image candidate.
///
/// `label` is the subreddit (or default label) used to name the uploaded file.
pub async fn resolve<T, S>(
    candidate: &Candidate,
    label: &str,
    transport: &T,
    store: &S,
) -> Result<MediaReference>
where
    T: Transport + ?Sized,
    S: ContentStore + ?Sized,
{
    let (media_url, extension, mime_type) = match (
        candidate.content_kind,
        candidate.media_url.as_deref(),
        candidate.media_extension.as_deref(),
        candidate.mime_type.as_deref(),
    ) {
        (ContentKind::Image, Some(url), Some(ext), Some(mime)) => (url, ext, mime),
        _ => {
            error!(?candidate, "[MEDIA][ERROR] resolve called without a complete image candidate");
            return Err(PickError::InvariantViolation(
                "media resolution requires an image candidate with url, extension and mime type"
                    .to_string(),
            ));
        }
    };

    info!(url = %media_url, "[MEDIA] Downloading media");
    let response = transport.get(media_url).await.map_err(|e| {
        error!(url = %media_url, error = %e, "[MEDIA][ERROR] Media download failed");
        PickError::upstream(media_url, e)
    })?;
    if !response.is_success() {
        error!(url = %media_url, status = response.status, "[MEDIA][ERROR] Unexpected status fetching media");
        return Err(PickError::upstream(
            media_url,
            format!("status {}", response.status),
        ));
    }

    let dimensions = image_dimensions(&response.body);
    let filename = upload_filename(label, extension);

    info!(
        filename = %filename,
        mime_type,
        bytes = response.body.len(),
        "[MEDIA] Uploading media to content store"
    );
    let content_uri = store
        .upload(NewMediaUpload {
            bytes: &response.body,
            mime_type,
            filename: &filename,
        })
        .await
        .map_err(|e| {
            error!(filename = %filename, error = %e, "[MEDIA][ERROR] Content store rejected upload");
            PickError::Upload {
                filename: filename.clone(),
                reason: e.to_string(),
            }
        })?;

    info!(content_uri = %content_uri, ?dimensions, "[MEDIA] Media stored");
    Ok(MediaReference {
        content_uri,
        mime_type: mime_type.to_string(),
        filename,
        width_px: dimensions.map(|(w, _)| w),
        height_px: dimensions.map(|(_, h)| h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn dimensions_read_from_png_header() {
        assert_eq!(image_dimensions(&png_bytes(3, 2)), Some((3, 2)));
    }

    #[test]
    fn dimensions_of_unknown_bytes_are_absent() {
        assert_eq!(image_dimensions(b"\x00\x00\x00\x18ftypmp42 not an image"), None);
        assert_eq!(image_dimensions(&[]), None);
    }

    #[test]
    fn filename_joins_label_and_extension() {
        assert_eq!(upload_filename("pics", "png"), "pics.png");
    }
}
