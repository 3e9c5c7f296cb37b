use serde::{Deserialize, Serialize};

/// Body of `POST /generations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationCreated {
    pub id: String,
}

/// Body of `GET /generations/{id}`.
///
/// Finished jobs carry either a single `image_url` or a list of `images`,
/// depending on the model behind the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationStatus {
    /// First `http(s)` URL among the returned images.
    pub fn first_url(&self) -> Option<&str> {
        self.image_url
            .iter()
            .map(String::as_str)
            .chain(self.images.iter().map(|image| image.url.as_str()))
            .map(str::trim)
            .find(|url| url.starts_with("http://") || url.starts_with("https://"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// A validated, finished character image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}
