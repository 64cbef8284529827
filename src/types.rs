use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use failure::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub label: String,
    pub kind: DeviceKind,
}

/// A still image carried as MIME type plus binary payload, interchangeable
/// with its `data:<mime>;base64,<payload>` string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> DataUrl {
        DataUrl {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn parse(s: &str) -> Result<DataUrl, Error> {
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| format_err!("Missing data: scheme in {:?}", s))?;
        let sep = rest
            .find(";base64,")
            .ok_or_else(|| format_err!("Missing base64 payload in {:?}", s))?;
        let mime = &rest[..sep];
        if mime.is_empty() {
            return Err(format_err!("Empty MIME type in {:?}", s));
        }
        let bytes = STANDARD
            .decode(&rest[sep + ";base64,".len()..])
            .map_err(|e| format_err!("Invalid base64 payload: {}", e))?;
        Ok(DataUrl {
            mime: mime.to_string(),
            bytes,
        })
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// One recognized plate; the crop is absent when the service returned none
/// for this index or the crop failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateHit {
    pub number: String,
    pub crop: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognitionResult {
    pub plates: Vec<PlateHit>,
}

/// Observable submission state. `Failed` keeps the previous result around;
/// only a later successful submission replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Pending,
    Ready,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trip() {
        let image = DataUrl::new("image/jpeg", vec![0xff, 0xd8, 0x01, 0x02]);
        let parsed = DataUrl::parse(&image.to_string()).unwrap();
        assert_eq!(parsed, image);
    }

    #[test]
    fn data_url_parse() {
        let parsed = DataUrl::parse("data:image/png;base64,AQID").unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(parsed.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn data_url_rejects_malformed() {
        assert!(DataUrl::parse("http://example.com/a.jpg").is_err());
        assert!(DataUrl::parse("data:image/jpeg,rawpayload").is_err());
        assert!(DataUrl::parse("data:;base64,AQID").is_err());
        assert!(DataUrl::parse("data:image/jpeg;base64,!!!").is_err());
    }
}
