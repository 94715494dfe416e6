//! Wire representations of the Gemini REST payloads.

use serde::{Deserialize, Serialize};

use crate::dao::provider::{Content, ContentRole, GenerateRequest, Part, UploadedFile};

const USER_ROLE: &str = "user";
const MODEL_ROLE: &str = "model";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,
    pub contents: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
pub struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<WireFileData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Gemma models reject `systemInstruction` with a 400.
fn accepts_system_instruction(model: &str) -> bool {
    !model.starts_with("gemma")
}

/// Prepend `instruction` to the first user content, adding one if the list starts otherwise.
fn fold_into_first_user_turn(contents: &mut Vec<WireContent>, instruction: String) {
    let part = WirePart::from(Part::Text(instruction));
    match contents.first_mut() {
        Some(first) if first.role == Some(USER_ROLE) => first.parts.insert(0, part),
        _ => contents.insert(
            0,
            WireContent {
                role: Some(USER_ROLE),
                parts: vec![part],
            },
        ),
    }
}

impl From<GenerateRequest> for GenerateContentBody {
    fn from(request: GenerateRequest) -> Self {
        let GenerateRequest {
            model,
            system_instruction,
            contents,
        } = request;
        let mut contents: Vec<WireContent> = contents.into_iter().map(Into::into).collect();

        let system_instruction = match system_instruction {
            Some(text) if !accepts_system_instruction(&model) => {
                fold_into_first_user_turn(&mut contents, text);
                None
            }
            other => other.map(|text| WireContent {
                role: None,
                parts: vec![WirePart::from(Part::Text(text))],
            }),
        };

        Self {
            system_instruction,
            contents,
        }
    }
}

impl From<Content> for WireContent {
    fn from(content: Content) -> Self {
        let role = match content.role {
            ContentRole::User => USER_ROLE,
            ContentRole::Model => MODEL_ROLE,
        };
        Self {
            role: Some(role),
            parts: content.parts.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => Self {
                text: Some(text),
                file_data: None,
            },
            Part::File { mime_type, uri } => Self {
                text: None,
                file_data: Some(WireFileData {
                    mime_type,
                    file_uri: uri,
                }),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; empty when the model produced none.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct StartUploadBody {
    pub file: StartUploadFile,
}

#[derive(Debug, Serialize)]
pub struct StartUploadFile {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub file: WireFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFile {
    pub name: String,
    pub uri: String,
    pub mime_type: Option<String>,
}

impl WireFile {
    pub fn into_uploaded(self, fallback_mime: &str) -> UploadedFile {
        UploadedFile {
            name: self.name,
            uri: self.uri,
            mime_type: self.mime_type.unwrap_or_else(|| fallback_mime.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}
