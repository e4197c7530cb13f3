use anyhow::Result;

/// Best-effort text recovery from an image. OCR is an optional capability:
/// the pipeline takes `Option<&dyn OcrEngine>` and an absent or failing
/// engine just means the image-based extraction layer is skipped.
pub trait OcrEngine {
    fn extract_text(&self, image: &[u8]) -> Result<String>;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Returns a fixed string for any input, for exercising the OCR layer.
    pub struct FixedOcr(pub String);

    impl OcrEngine for FixedOcr {
        fn extract_text(&self, _image: &[u8]) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// Always fails, for verifying that OCR errors are non-fatal.
    pub struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn extract_text(&self, _image: &[u8]) -> Result<String> {
            anyhow::bail!("ocr backend unavailable")
        }
    }
}
