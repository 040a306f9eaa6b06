//! Messages API wire types.
//!
//! Only the fields Sleuth reads or writes are modeled. Response content
//! blocks use one permissive struct because text, server tool use, and the
//! several code-execution result block types share a handful of fields.

use serde::{Deserialize, Serialize};

/// Tool name registered for the code-execution tool.
pub const CODE_EXECUTION_TOOL_NAME: &str = "code_execution";

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec<'a>>,
}

impl<'a> MessagesRequest<'a> {
    #[must_use]
    pub const fn new(model: &'a str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model,
            max_tokens,
            temperature,
            system: None,
            messages: Vec::new(),
            tools: Vec::new(),
        }
    }

    #[must_use]
    pub const fn system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role: "user",
            content: MessageContent::Text(content.into()),
        });
        self
    }

    /// Append a user turn made of explicit content blocks.
    #[must_use]
    pub fn user_blocks(mut self, blocks: Vec<InputBlock>) -> Self {
        self.messages.push(Message {
            role: "user",
            content: MessageContent::Blocks(blocks),
        });
        self
    }

    #[must_use]
    pub fn tool(mut self, tool_type: &'a str, name: &'a str) -> Self {
        self.tools.push(ToolSpec {
            tool_type,
            name,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

/// A plain string, or a list of typed blocks.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<InputBlock>),
}

/// Request-side content blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputBlock {
    Text { text: String },
    /// Places a previously uploaded file into the code-execution container.
    ContainerUpload { file_id: String },
}

/// Metadata returned by the Files API for an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec<'a> {
    #[serde(rename = "type")]
    pub tool_type: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text of every `text` block.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    /// Result payload on `*_tool_result` blocks.
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_empty_optionals() {
        let request = MessagesRequest::new("claude-sonnet-4-5", 1024, 0.0).user("hello");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("tools").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn request_with_tool_serializes_type_field() {
        let request = MessagesRequest::new("m", 10, 0.0)
            .system("sys")
            .tool("code_execution_20250825", CODE_EXECUTION_TOOL_NAME);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["tools"][0]["type"], "code_execution_20250825");
        assert_eq!(json["tools"][0]["name"], "code_execution");
    }

    #[test]
    fn container_upload_blocks_serialize_with_type_tag() {
        let request = MessagesRequest::new("m", 10, 0.0).user_blocks(vec![
            InputBlock::Text {
                text: "run it".into(),
            },
            InputBlock::ContainerUpload {
                file_id: "file_011CNha8iCJcU1wXNR6q4V8w".into(),
            },
        ]);
        let json = serde_json::to_value(&request).unwrap();
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "run it");
        assert_eq!(content[1]["type"], "container_upload");
        assert_eq!(content[1]["file_id"], "file_011CNha8iCJcU1wXNR6q4V8w");
    }

    #[test]
    fn file_object_reads_id() {
        let file: FileObject = serde_json::from_str(
            r#"{"type": "file", "id": "file_abc", "filename": "data.csv", "size_bytes": 42,
                "mime_type": "text/csv", "created_at": "2025-04-14T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(file.id, "file_abc");
        assert_eq!(file.size_bytes, Some(42));
    }

    #[test]
    fn response_text_joins_text_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "text", "text": "import pandas as pd"},
                    {"type": "server_tool_use", "name": "bash_code_execution", "input": {}},
                    {"type": "text", "text": "print(1)"}
                ],
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();
        assert_eq!(response.text(), "import pandas as pd\nprint(1)");
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }
}
