use std::sync::LazyLock;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.jigsawstack.com";
pub const API_KEY_HEADER: &str = "x-api-key";

pub const SCRAPE_PATH: &str = "/v1/ai/scrape";
pub const SUMMARY_PATH: &str = "/v1/ai/summary";
pub const IMAGE_GENERATION_PATH: &str = "/v1/ai/image_generation";
pub const PROMPT_ENGINE_PATH: &str = "/v1/prompt_engine";

pub const DEFAULT_SUMMARY_TYPE: &str = "text";
pub const DEFAULT_IMAGE_MODEL: &str = "sdxl";
pub const DEFAULT_IMAGE_SIZE: &str = "medium";
pub const DEFAULT_LIST_PAGE: u32 = 1;
pub const DEFAULT_LIST_LIMIT: u32 = 30;

// (value, label) as shown in the playground model picker
pub const IMAGE_MODELS: [(&str, &str); 7] = [
    ("sdxl", "Stable Diffusion XL"),
    ("sd1.5", "Stable Diffusion v1.5"),
    ("ead1.0", "Anime Diffusion"),
    ("rv1.3", "Realistic Vision v1.3"),
    ("rv3", "Realistic Vision v3"),
    ("rv5.1", "Realistic Vision v5.1"),
    ("ar1.8", "AbsoluteReality v1.8.1"),
];

pub const IMAGE_SIZES: [&str; 3] = ["small", "medium", "large"];

pub fn image_model_label(model: &str) -> Option<&'static str> {
    IMAGE_MODELS
        .iter()
        .find(|(value, _)| *value == model)
        .map(|(_, label)| *label)
}

pub fn is_known_image_model(model: &str) -> bool {
    image_model_label(model).is_some()
}

pub fn is_known_image_size(size: &str) -> bool {
    IMAGE_SIZES.contains(&size)
}

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "jigsaw-playground/{} {}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
});
