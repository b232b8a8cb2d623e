//! Tab-based state machine behind the playground page.
//!
//! One tab is active at a time. Each tab owns a draft, and the view has a
//! single loading flag and result slot. A submit hands out a [`Submission`]
//! tagged with a generation number and a cancellation token; switching tabs
//! cancels the token and bumps the generation, so a late reply for the old
//! tab is dropped instead of rendered.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::{
    image_model_label, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, DEFAULT_SUMMARY_TYPE,
};
use crate::ui::api::{ApiCall, ApiFailure, ApiReply, PlaygroundApi};
use crate::ui::format::{format_output, format_scrape_data, SummaryView};
use crate::ui::object_url::{ObjectUrl, ObjectUrlRegistry};

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const URL_REQUIRED: &str = "Please enter a URL to scrape";
pub const ELEMENT_PROMPT_REQUIRED: &str = "Please add at least one element prompt";
pub const PROMPT_SUCCESS_MESSAGE: &str = "Prompt executed successfully";
const PROMPT_FAILED: &str = "Failed to create and run prompt";
const IMAGE_FAILED: &str = "Failed to generate image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Prompt,
    Scrape,
    Summary,
    Image,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDraft {
    pub prompt: String,
    pub inputs: Vec<InputRow>,
}

impl PromptDraft {
    /// Rows with an empty key or value are left out.
    pub fn input_values(&self) -> BTreeMap<String, String> {
        self.inputs
            .iter()
            .filter(|row| !row.key.is_empty() && !row.value.is_empty())
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeDraft {
    pub url: String,
    pub element_prompts: Vec<String>,
}

impl Default for ScrapeDraft {
    fn default() -> Self {
        Self {
            url: String::new(),
            element_prompts: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryDraft {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDraft {
    pub prompt: String,
    pub model: String,
}

impl Default for ImageDraft {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub prompt: PromptDraft,
    pub scrape: ScrapeDraft,
    pub summary: SummaryDraft,
    pub image: ImageDraft,
}

#[derive(Debug, Default)]
pub enum ResultSlot {
    #[default]
    Empty,
    Prompt {
        message: String,
        output: String,
    },
    Scrape {
        data: String,
    },
    Summary(SummaryView),
    Image {
        url: ObjectUrl,
        model_label: String,
    },
    Error {
        error: String,
        details: Option<String>,
    },
}

impl ResultSlot {
    fn error(error: impl Into<String>, details: Option<String>) -> Self {
        ResultSlot::Error {
            error: error.into(),
            details,
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub active_tab: Tab,
    pub drafts: Drafts,
    pub loading: bool,
    pub result: ResultSlot,
}

#[derive(Debug)]
pub enum Outcome {
    Completed(Result<ApiReply, ApiFailure>),
    Cancelled,
}

/// A single in-flight call. Runs independently of the orchestrator so the
/// view can keep changing while it is pending.
pub struct Submission {
    pub generation: u64,
    pub tab: Tab,
    pub call: ApiCall,
    pub cancel: CancellationToken,
    api: Arc<dyn PlaygroundApi>,
}

impl Submission {
    pub async fn execute(&self) -> Outcome {
        tokio::select! {
            _ = self.cancel.cancelled() => Outcome::Cancelled,
            reply = self.api.call(&self.call) => Outcome::Completed(reply),
        }
    }
}

pub struct Orchestrator {
    api: Arc<dyn PlaygroundApi>,
    urls: ObjectUrlRegistry,
    view: ViewState,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn PlaygroundApi>, urls: ObjectUrlRegistry) -> Self {
        Self {
            api,
            urls,
            view: ViewState::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn drafts_for(&mut self, tab: Tab) -> Option<&mut Drafts> {
        if self.view.active_tab == tab {
            Some(&mut self.view.drafts)
        } else {
            debug!("Ignoring edit for inactive tab {:?}", tab);
            None
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        if let Some(d) = self.drafts_for(Tab::Prompt) {
            d.prompt.prompt = prompt.to_string();
        }
    }

    pub fn add_input_row(&mut self) {
        if let Some(d) = self.drafts_for(Tab::Prompt) {
            d.prompt.inputs.push(InputRow::default());
        }
    }

    pub fn edit_input_row(&mut self, index: usize, key: &str, value: &str) {
        if let Some(row) = self
            .drafts_for(Tab::Prompt)
            .and_then(|d| d.prompt.inputs.get_mut(index))
        {
            row.key = key.to_string();
            row.value = value.to_string();
        }
    }

    pub fn remove_input_row(&mut self, index: usize) {
        if let Some(d) = self.drafts_for(Tab::Prompt) {
            if index < d.prompt.inputs.len() {
                d.prompt.inputs.remove(index);
            }
        }
    }

    pub fn set_url(&mut self, url: &str) {
        if let Some(d) = self.drafts_for(Tab::Scrape) {
            d.scrape.url = url.to_string();
        }
    }

    pub fn add_element_prompt(&mut self) {
        if let Some(d) = self.drafts_for(Tab::Scrape) {
            d.scrape.element_prompts.push(String::new());
        }
    }

    pub fn edit_element_prompt(&mut self, index: usize, value: &str) {
        if let Some(slot) = self
            .drafts_for(Tab::Scrape)
            .and_then(|d| d.scrape.element_prompts.get_mut(index))
        {
            *slot = value.to_string();
        }
    }

    pub fn remove_element_prompt(&mut self, index: usize) {
        if let Some(d) = self.drafts_for(Tab::Scrape) {
            if index < d.scrape.element_prompts.len() {
                d.scrape.element_prompts.remove(index);
            }
        }
    }

    pub fn set_summary_text(&mut self, text: &str) {
        if let Some(d) = self.drafts_for(Tab::Summary) {
            d.summary.text = text.to_string();
        }
    }

    pub fn set_image_prompt(&mut self, prompt: &str) {
        if let Some(d) = self.drafts_for(Tab::Image) {
            d.image.prompt = prompt.to_string();
        }
    }

    pub fn select_model(&mut self, model: &str) {
        if let Some(d) = self.drafts_for(Tab::Image) {
            d.image.model = model.to_string();
        }
    }

    // Local checks the page runs before any request goes out.
    fn build_call(&self) -> Result<ApiCall, ResultSlot> {
        let drafts = &self.view.drafts;
        match self.view.active_tab {
            Tab::Prompt => {
                if drafts.prompt.prompt.is_empty() {
                    return Err(ResultSlot::error(
                        PROMPT_FAILED,
                        Some(PROMPT_REQUIRED.to_string()),
                    ));
                }
                Ok(ApiCall::CreateAndRunPrompt {
                    query: drafts.prompt.prompt.clone(),
                    inputs: drafts.prompt.input_values(),
                })
            }
            Tab::Scrape => {
                if drafts.scrape.url.is_empty() {
                    return Err(ResultSlot::error(URL_REQUIRED, None));
                }
                let element_prompts: Vec<String> = drafts
                    .scrape
                    .element_prompts
                    .iter()
                    .filter(|p| !p.trim().is_empty())
                    .cloned()
                    .collect();
                if element_prompts.is_empty() {
                    return Err(ResultSlot::error(ELEMENT_PROMPT_REQUIRED, None));
                }
                Ok(ApiCall::Scrape {
                    url: drafts.scrape.url.clone(),
                    element_prompts,
                })
            }
            Tab::Summary => Ok(ApiCall::Summary {
                text: drafts.summary.text.clone(),
                summary_type: DEFAULT_SUMMARY_TYPE.to_string(),
            }),
            Tab::Image => Ok(ApiCall::GenerateImage {
                prompt: drafts.image.prompt.clone(),
                model: drafts.image.model.clone(),
                size: DEFAULT_IMAGE_SIZE.to_string(),
            }),
        }
    }

    /// Starts a submit for the active tab. Returns `None` when a call is
    /// already pending or local validation fails; in the latter case the
    /// error is placed in the result slot.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.view.loading {
            debug!("Submit ignored: a request is already in flight");
            return None;
        }

        self.view.result = ResultSlot::Empty;
        let call = match self.build_call() {
            Ok(call) => call,
            Err(slot) => {
                self.view.result = slot;
                return None;
            }
        };

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.view.loading = true;
        debug!(
            "Submitting {:?} as generation {} to {}",
            self.view.active_tab,
            self.generation,
            call.route()
        );

        Some(Submission {
            generation: self.generation,
            tab: self.view.active_tab,
            call,
            cancel,
            api: self.api.clone(),
        })
    }

    /// Applies an outcome if it belongs to the current generation. Returns
    /// whether the view changed.
    pub fn complete(&mut self, generation: u64, outcome: Outcome) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale outcome for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }

        self.in_flight = None;
        self.view.loading = false;
        let reply = match outcome {
            Outcome::Cancelled => {
                debug!("Generation {} was cancelled", generation);
                return true;
            }
            Outcome::Completed(reply) => reply,
        };
        self.view.result = self.render(reply);
        true
    }

    fn render(&self, reply: Result<ApiReply, ApiFailure>) -> ResultSlot {
        let drafts = &self.view.drafts;
        match (self.view.active_tab, reply) {
            (Tab::Prompt, Ok(ApiReply::Json(body))) => {
                let output = match body.get("result") {
                    Some(serde_json::Value::String(text)) => format_output(text),
                    Some(other) => format_output(&other.to_string()),
                    None => String::new(),
                };
                ResultSlot::Prompt {
                    message: PROMPT_SUCCESS_MESSAGE.to_string(),
                    output,
                }
            }
            (Tab::Prompt, Err(failure)) => {
                ResultSlot::error(PROMPT_FAILED, failure.details.or(Some(failure.error)))
            }
            (Tab::Scrape, Ok(ApiReply::Json(body))) => match format_scrape_data(&body) {
                Some(data) => ResultSlot::Scrape { data },
                None => ResultSlot::error("Unexpected scrape response", None),
            },
            (Tab::Summary, Ok(ApiReply::Json(body))) => {
                ResultSlot::Summary(SummaryView::from_response(&body))
            }
            (Tab::Image, Ok(ApiReply::Image(bytes))) => ResultSlot::Image {
                url: self.urls.create(bytes, "image/png"),
                model_label: image_model_label(&drafts.image.model)
                    .unwrap_or(drafts.image.model.as_str())
                    .to_string(),
            },
            (Tab::Image, Err(failure)) => {
                ResultSlot::error(IMAGE_FAILED, failure.details.or(Some(failure.error)))
            }
            (_, Err(failure)) => ResultSlot::error(failure.error, failure.details),
            (tab, Ok(_)) => ResultSlot::error(format!("Unexpected response for {:?}", tab), None),
        }
    }

    /// Cancels the pending call, then resets every draft and the result.
    pub fn switch_tab(&mut self, tab: Tab) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation += 1;
        self.view = ViewState {
            active_tab: tab,
            ..ViewState::default()
        };
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}
