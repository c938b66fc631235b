use serde::{Deserialize, Serialize};

use crate::page::PropertyPageConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalType {
    #[default]
    Add,
    Update,
    Clone,
}

impl ModalType {
    pub fn as_str(&self) -> &str {
        match self {
            ModalType::Add => "ADD",
            ModalType::Update => "UPDATE",
            ModalType::Clone => "CLONE",
        }
    }

    /// Added and cloned items get focus once stored.
    pub fn focuses_result(&self) -> bool {
        matches!(self, ModalType::Add | ModalType::Clone)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    SelectSource,
    #[default]
    Properties,
}

impl PageType {
    pub fn as_str(&self) -> &str {
        match self {
            PageType::SelectSource => "SELECT_SOURCE",
            PageType::Properties => "PROPERTIES",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalPage {
    pub name: String,
    pub page_type: PageType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Terminal request a wizard submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    pub endpoint: String,
    #[serde(default, deserialize_with = "method_any_case")]
    pub method: HttpMethod,
    #[serde(default)]
    pub button_value: String,
    #[serde(default)]
    pub success_message: String,
    #[serde(default)]
    pub error_message: String,
}

fn method_any_case<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<HttpMethod, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.to_uppercase().as_str() {
        "GET" => Ok(HttpMethod::Get),
        "POST" => Ok(HttpMethod::Post),
        "PUT" => Ok(HttpMethod::Put),
        "PATCH" => Ok(HttpMethod::Patch),
        "DELETE" => Ok(HttpMethod::Delete),
        other => Err(serde::de::Error::custom(format!("unsupported HTTP method '{other}'"))),
    }
}

/// Response of `GET /modal/{action}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub modal_type: ModalType,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub pages: Vec<ModalPage>,
    #[serde(default)]
    pub action: Option<ActionDescriptor>,
    #[serde(default)]
    pub property_page: PropertyPageConfig,
}

impl ModalDescriptor {
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            resource_type_name(&self.resource)
        } else {
            self.title.clone()
        }
    }
}

/// Error body returned by the server for failed requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestError {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: String,
}

/// Human readable type name of a resource: `test-resource` -> `Test resource`.
pub fn resource_type_name(resource: &str) -> String {
    let spaced = resource.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
