//! Messages exchanged with a Live View.
//!
//! Both directions are JSON objects tagged by `type`:
//!
//! ```json
//! {"type":"ready"}
//! {"type":"update","content":"## Todo\n"}
//! {"type":"edit","mutation":{"type":"toggleCard","cardId":"card-01h..."}}
//! {"type":"init","content":"## Todo\n","displayName":"board.md","model":{...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::templates::Template;

/// View → controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewMessage<E> {
    /// The view has loaded and wants the current content
    Ready,
    /// The view's full content after a local edit
    Update { content: String },
    /// A structured edit for the host to perform
    Edit { mutation: E },
    RequestTemplates,
    /// Requests the controller does not interpret (open link, pick file, ...)
    Passthrough {
        kind: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

/// Controller → view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage<M> {
    Init {
        content: String,
        display_name: String,
        model: M,
    },
    Update {
        content: String,
        model: M,
    },
    Templates {
        templates: Vec<Template>,
    },
}

impl<M> HostMessage<M> {
    /// The text carried by `init`/`update`
    pub fn content(&self) -> Option<&str> {
        match self {
            HostMessage::Init { content, .. } | HostMessage::Update { content, .. } => {
                Some(content)
            }
            HostMessage::Templates { .. } => None,
        }
    }
}
