use serde::{ Serialize, Deserialize };

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub detail: String,
}
