//! HTTP media transform: fetch, center-crop, re-encode.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;

use crate::clients::base::{AspectRatio, ClientError, MediaTransform};
use rk_protocol::CroppedImage;

/// Crops a remote image to the target aspect ratio.
///
/// The result is returned as a `data:` URI so downstream providers that
/// accept inline images need no intermediate upload.
pub struct HttpMediaTransform {
    http: reqwest::Client,
}

impl HttpMediaTransform {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, image_url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|e| ClientError::InvalidInput(format!("failed to fetch {image_url}: {e}")))?;

        if !response.status().is_success() {
            return Err(ClientError::InvalidInput(format!(
                "source image fetch returned {} for {image_url}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read image body: {e}")))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl MediaTransform for HttpMediaTransform {
    async fn crop_to_aspect_ratio(
        &self,
        image_url: &str,
        ratio: AspectRatio,
    ) -> Result<CroppedImage, ClientError> {
        if image_url.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "source image URL is empty".to_string(),
            ));
        }

        let bytes = self.fetch(image_url).await?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ClientError::InvalidInput(format!("source is not a decodable image: {e}")))?;

        let (x, y, width, height) = crop_rect(decoded.width(), decoded.height(), ratio);
        let cropped = decoded.crop_imm(x, y, width, height);

        let mut encoded = Vec::new();
        cropped
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
            .map_err(|e| ClientError::InvalidInput(format!("failed to encode cropped image: {e}")))?;

        Ok(CroppedImage {
            reference: format!("data:image/jpeg;base64,{}", BASE64.encode(&encoded)),
            width,
            height,
        })
    }
}

/// Largest centered rectangle of the given aspect ratio that fits in a
/// `width` x `height` image. Returns `(x, y, crop_width, crop_height)`.
pub(crate) fn crop_rect(width: u32, height: u32, ratio: AspectRatio) -> (u32, u32, u32, u32) {
    let target = ratio.as_f64();
    let current = f64::from(width) / f64::from(height);

    if current > target {
        // Too wide: trim the sides.
        let crop_width = (f64::from(height) * target).round() as u32;
        let crop_width = crop_width.clamp(1, width);
        let x = (width - crop_width) / 2;
        (x, 0, crop_width, height)
    } else {
        // Too tall (or exact): trim top and bottom.
        let crop_height = (f64::from(width) / target).round() as u32;
        let crop_height = crop_height.clamp(1, height);
        let y = (height - crop_height) / 2;
        (0, y, width, crop_height)
    }
}
