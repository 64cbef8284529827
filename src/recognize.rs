use crate::types::{DataUrl, PlateHit, RecognitionResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use failure::Error;
use image::io::Reader as ImageReader;
use image::ImageFormat;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::io::Cursor;
use url::Url;

/// Client for the remote recognition endpoint. One image per request,
/// posted as a single multipart `file` field.
pub struct Recognizer {
    client: reqwest::Client,
    endpoint: Url,
}

impl Recognizer {
    pub fn new(endpoint: Url) -> Recognizer {
        Recognizer {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn recognize(&self, image: &DataUrl) -> Result<RecognitionResult, Error> {
        let part = Part::bytes(image.bytes.clone())
            .file_name("capture.jpg")
            .mime_str(&image.mime)?;
        let form = Form::new().part("file", part);
        debug!(
            "Posting {} byte image to {}",
            image.bytes.len(),
            self.endpoint
        );
        let response: Value = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        parse_response(&response)
    }
}

fn parse_response(value: &Value) -> Result<RecognitionResult, Error> {
    let numbers = value["plate_numbers"]
        .as_array()
        .ok_or_else(|| format_err!("Missing plate_numbers in response"))?;
    let crops = value["encoded_plates"].as_array();
    let mut plates = Vec::with_capacity(numbers.len());
    for (i, number) in numbers.iter().enumerate() {
        let number = number
            .as_str()
            .ok_or_else(|| format_err!("Non-string plate number at index {}", i))?;
        let crop = crops
            .and_then(|c| c.get(i))
            .and_then(Value::as_str)
            .and_then(decode_crop);
        plates.push(PlateHit {
            number: number.to_string(),
            crop,
        });
    }
    Ok(RecognitionResult { plates })
}

// A bad crop is not worth failing the whole result over; the plate number
// still stands on its own.
fn decode_crop(encoded: &str) -> Option<Vec<u8>> {
    let bytes = match STANDARD.decode(encoded) {
        Ok(b) => b,
        Err(e) => {
            warn!("Failed to decode crop base64: {:?}", e);
            return None;
        }
    };
    match ImageReader::with_format(Cursor::new(bytes.as_slice()), ImageFormat::Jpeg).decode() {
        Ok(_) => Some(bytes),
        Err(e) => {
            warn!("Failed to decode crop image: {:?}", e);
            None
        }
    }
}
