use serde::Serialize;

use crate::error::{PickError, Result};
use crate::media::MediaReference;
use crate::policy::ResponseMode;
use crate::select::Candidate;

/// What the chat layer sends back to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputContent {
    /// Delivery form: plain message, threaded reply or uploaded media.
    pub mode: ResponseMode,
    pub display_body: String,
    pub external_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaReference>,
}

/// Map a resolved candidate onto the content object for `mode`. Pure.
///
/// Link modes never carry media; upload mode must.
pub fn assemble(
    candidate: &Candidate,
    media: Option<&MediaReference>,
    mode: ResponseMode,
) -> Result<OutputContent> {
    match (mode, media) {
        (ResponseMode::LinkMessage | ResponseMode::LinkReply, None) => Ok(OutputContent {
            mode,
            display_body: candidate.permalink.clone(),
            external_link: candidate.permalink.clone(),
            media: None,
        }),
        (ResponseMode::Upload, Some(media)) => Ok(OutputContent {
            mode,
            display_body: media.filename.clone(),
            external_link: candidate.permalink.clone(),
            media: Some(media.clone()),
        }),
        (ResponseMode::Upload, None) => Err(PickError::InvariantViolation(
            "upload mode requires a media reference".to_string(),
        )),
        (_, Some(_)) => Err(PickError::InvariantViolation(format!(
            "{mode} mode cannot carry a media reference"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::ContentKind;

    fn candidate(kind: ContentKind, mode: ResponseMode) -> Candidate {
        Candidate {
            permalink: "https://reddit.com/r/pics/comments/1/cat/".to_string(),
            media_url: Some("https://i.redd.it/cat.png".to_string()),
            media_extension: Some("png".to_string()),
            mime_type: Some("image/png".to_string()),
            content_kind: kind,
            mode,
        }
    }

    fn media() -> MediaReference {
        MediaReference {
            content_uri: "mxc://example.org/abc".to_string(),
            mime_type: "image/png".to_string(),
            filename: "pics.png".to_string(),
            width_px: Some(640),
            height_px: None,
        }
    }

    #[test]
    fn link_modes_use_permalink() {
        let c = candidate(ContentKind::Link, ResponseMode::LinkReply);
        let out = assemble(&c, None, ResponseMode::LinkReply).unwrap();
        assert_eq!(out.external_link, c.permalink);
        assert_eq!(out.display_body, c.permalink);
        assert_eq!(out.media, None);
        assert_eq!(out.mode, ResponseMode::LinkReply);
    }

    #[test]
    fn upload_mode_carries_media_and_filename_body() {
        let c = candidate(ContentKind::Image, ResponseMode::Upload);
        let m = media();
        let out = assemble(&c, Some(&m), ResponseMode::Upload).unwrap();
        assert_eq!(out.display_body, "pics.png");
        assert_eq!(out.media, Some(m));
        assert_eq!(out.external_link, c.permalink);
    }

    #[test]
    fn assemble_is_idempotent() {
        let c = candidate(ContentKind::Image, ResponseMode::Upload);
        let m = media();
        let first = assemble(&c, Some(&m), ResponseMode::Upload).unwrap();
        let second = assemble(&c, Some(&m), ResponseMode::Upload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn upload_without_media_is_an_invariant_violation() {
        let c = candidate(ContentKind::Image, ResponseMode::Upload);
        assert!(matches!(
            assemble(&c, None, ResponseMode::Upload),
            Err(PickError::InvariantViolation(_))
        ));
        assert!(matches!(
            assemble(&c, Some(&media()), ResponseMode::LinkMessage),
            Err(PickError::InvariantViolation(_))
        ));
    }
}
