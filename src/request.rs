//! Validation and normalization of inbound generation requests.

use crate::models::GenerationRequest;
use crate::style::NormalizedStyle;
use crate::{Error, Result};

pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Media types the upload form accepts. Others are forwarded with a warning.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Base64 image payload plus its declared media type, ready to inline into a
/// provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Parse a data URI such as `data:image/png;base64,iVBOR...`.
    ///
    /// Everything after the first comma is the payload. The media type comes
    /// from a `data:<type>/<subtype>;base64,` declaration when one is present.
    pub fn from_data_uri(image: &str) -> Result<Self> {
        let data = match image.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => payload,
            _ => return Err(Error::InvalidImageFormat),
        };

        let mime_type = declared_media_type(image).unwrap_or(DEFAULT_MEDIA_TYPE);

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

/// Finds the first well-formed `data:<type>/<subtype>;base64,` declaration.
fn declared_media_type(image: &str) -> Option<&str> {
    image.match_indices("data:").find_map(|(start, marker)| {
        let rest = &image[start + marker.len()..];
        let (media_type, _) = rest.split_once(";base64,")?;
        let (kind, subtype) = media_type.split_once('/')?;

        let kind_ok = !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric());
        let subtype_ok = !subtype.is_empty()
            && subtype
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'));

        (kind_ok && subtype_ok).then_some(media_type)
    })
}

/// A request that passed validation, with display strings and resolved style keys.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub image: InlineImage,
    pub focus: String,
    pub mood_display: String,
    pub language_display: String,
    pub style: NormalizedStyle,
}

/// Validate a raw request and derive everything the prompt builder needs.
///
/// Field presence is checked before anything else, so a request missing a field
/// never reaches image parsing.
pub fn normalize(request: GenerationRequest) -> Result<NormalizedRequest> {
    let GenerationRequest {
        image,
        focus,
        mood,
        language,
    } = request;

    let (image, focus, mood, language) = match (image, focus, mood, language) {
        (Some(image), Some(focus), Some(mood), Some(language))
            if !image.is_empty() && !focus.is_empty() && !mood.is_empty() && !language.is_empty() =>
        {
            (image, focus, mood, language)
        }
        _ => return Err(Error::MissingFields),
    };

    let image = InlineImage::from_data_uri(&image)?;
    if !SUPPORTED_MEDIA_TYPES.contains(&image.mime_type.as_str()) {
        tracing::warn!(
            "Declared media type {} is not one the upload form offers; forwarding anyway",
            image.mime_type
        );
    }

    let mood_display = mood.display();
    let language_display = language.display();
    let style = NormalizedStyle::resolve(&mood_display, &language_display);

    tracing::debug!(
        "Normalized request: mood={} ({}), language={} ({}), media type {}",
        mood_display,
        style.mood_key,
        language_display,
        style.language_key,
        image.mime_type
    );

    Ok(NormalizedRequest {
        image,
        focus,
        mood_display,
        language_display,
        style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TextOrList;
    use pretty_assertions::assert_eq;

    fn request() -> GenerationRequest {
        GenerationRequest {
            image: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            focus: Some("sunset over the river".to_string()),
            mood: Some(TextOrList::List(vec![
                "Romantic".to_string(),
                "Funny".to_string(),
            ])),
            language: Some(TextOrList::Text("Banglish".to_string())),
        }
    }

    #[test]
    fn test_normalize_full_request() {
        let normalized = normalize(request()).unwrap();
        assert_eq!(
            normalized.image,
            InlineImage {
                mime_type: "image/png".to_string(),
                data: "iVBORw0KGgo=".to_string(),
            }
        );
        assert_eq!(normalized.focus, "sunset over the river");
        assert_eq!(normalized.mood_display, "Romantic & Funny");
        assert_eq!(normalized.language_display, "Banglish");
        assert_eq!(normalized.style.mood_key, "Romantic");
        assert_eq!(normalized.style.language_key, "Banglish");
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        let cases: [fn(&mut GenerationRequest); 6] = [
            |r: &mut GenerationRequest| r.image = None,
            |r: &mut GenerationRequest| r.focus = None,
            |r: &mut GenerationRequest| r.mood = None,
            |r: &mut GenerationRequest| r.language = None,
            |r: &mut GenerationRequest| r.focus = Some(String::new()),
            |r: &mut GenerationRequest| r.mood = Some(TextOrList::List(Vec::new())),
        ];

        for mutate in cases {
            let mut req = request();
            mutate(&mut req);
            assert!(matches!(normalize(req), Err(Error::MissingFields)));
        }
    }

    #[test]
    fn test_missing_fields_checked_before_image() {
        let mut req = request();
        req.image = Some("not a data uri".to_string());
        req.language = None;
        assert!(matches!(normalize(req), Err(Error::MissingFields)));
    }

    #[test]
    fn test_image_without_payload_is_invalid() {
        for image in ["data:image/png;base64", "data:image/png;base64,", "plain"] {
            let mut req = request();
            req.image = Some(image.to_string());
            assert!(
                matches!(normalize(req), Err(Error::InvalidImageFormat)),
                "{} should be rejected",
                image
            );
        }
    }

    #[test]
    fn test_media_type_defaults_to_jpeg() {
        let image = InlineImage::from_data_uri("garbage,QUJD").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "QUJD");
    }

    #[test]
    fn test_media_type_with_symbols() {
        let image = InlineImage::from_data_uri("data:image/svg+xml;base64,PHN2Zz4=").unwrap();
        assert_eq!(image.mime_type, "image/svg+xml");

        let image = InlineImage::from_data_uri("data:image/heic;base64,AAAA").unwrap();
        assert_eq!(image.mime_type, "image/heic");
    }

    #[test]
    fn test_malformed_declaration_falls_back() {
        let image = InlineImage::from_data_uri("data:image png;base64,AAAA").unwrap();
        assert_eq!(image.mime_type, DEFAULT_MEDIA_TYPE);
    }
}
