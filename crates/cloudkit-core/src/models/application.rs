use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference to another resource, sent either as a bare id or as an
/// object carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelRef {
    Id(String),
    Model { id: String },
}

impl ModelRef {
    pub fn id(&self) -> &str {
        match self {
            ModelRef::Id(id) => id,
            ModelRef::Model { id } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub repo_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ModelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hosting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub application: ModelRef,
    #[serde(rename = "gitURL")]
    pub git_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub replicas: Option<u32>,
    #[serde(default)]
    pub replica_size: Option<String>,
    #[serde(default)]
    pub running: Option<bool>,
}

impl Environment {
    pub fn display_replicas(&self) -> String {
        match (self.replicas, self.replica_size.as_deref()) {
            (Some(count), Some(size)) => format!("{} x {}", count, size),
            (Some(count), None) => format!("{} replicas", count),
            _ => "Unknown".to_string(),
        }
    }
}

/// List endpoints answer either with a bare array or with a page wrapping
/// the items in `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { data: Vec<T> },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { data } => data,
            Listing::Items(items) => items,
        }
    }
}
