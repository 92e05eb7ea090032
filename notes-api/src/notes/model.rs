use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::UserId;

pub type NoteId = Uuid;
pub type ItemId = Uuid;
pub type LabelId = Uuid;

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_COLOR: &str = "gray";
pub const DEFAULT_ITEM_NAME: &str = "No Item";
pub const DEFAULT_LABEL_NAME: &str = "No Label";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub color: String,
    pub archived: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    pub id: ItemId,
    pub note_id: NoteId,
    pub name: String,
    pub completed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Label {
    pub id: LabelId,
    pub user_id: UserId,
    pub label_name: String,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A note with its current items and labels. Every note-shaped response uses this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub items: Vec<Item>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelNotes {
    pub label: Label,
    pub notes: Vec<NoteView>,
}

// Requests

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CreateNote {
    pub title: Option<String>,
    /// Name of the first checklist item.
    pub name: Option<String>,
    pub color: Option<String>,
    /// Name of the first label.
    pub label_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditNoteTitle {
    pub id: NoteId,
    pub title: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditNoteColor {
    pub id: NoteId,
    pub color: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoteIdBody {
    pub id: NoteId,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddItem {
    /// Id of the note the item is added to.
    #[serde(alias = "noteId")]
    pub id: NoteId,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditItemName {
    pub id: ItemId,
    pub name: String,
    pub note_id: NoteId,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleItemStatus {
    pub id: ItemId,
    pub completed: bool,
    pub note_id: NoteId,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItem {
    pub item_id: ItemId,
    pub note_id: NoteId,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CreateLabel {
    pub label_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteLabel {
    pub label_id: LabelId,
    pub note_id: NoteId,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditLabel {
    #[serde(rename = "labelId")]
    pub label_id: LabelId,
    pub label_name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteLabel {
    #[serde(rename = "labelId")]
    pub label_id: LabelId,
}

// Responses

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NoteResponse {
    pub note: NoteView,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NotesResponse {
    pub notes: Vec<NoteView>,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NotesByLabelResponse {
    pub notes: Vec<LabelNotes>,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LabelResponse {
    pub label: Label,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LabelsResponse {
    pub labels: Vec<Label>,
    pub success: bool,
}

impl From<NoteView> for NoteResponse {
    fn from(note: NoteView) -> Self {
        Self { note, success: true }
    }
}

impl From<Vec<NoteView>> for NotesResponse {
    fn from(notes: Vec<NoteView>) -> Self {
        Self { notes, success: true }
    }
}

impl From<Vec<LabelNotes>> for NotesByLabelResponse {
    fn from(notes: Vec<LabelNotes>) -> Self {
        Self { notes, success: true }
    }
}

impl From<Vec<Item>> for ItemsResponse {
    fn from(items: Vec<Item>) -> Self {
        Self { items, success: true }
    }
}

impl From<Label> for LabelResponse {
    fn from(label: Label) -> Self {
        Self { label, success: true }
    }
}

impl From<Vec<Label>> for LabelsResponse {
    fn from(labels: Vec<Label>) -> Self {
        Self { labels, success: true }
    }
}

/// Absent or blank values fall back to `default`.
pub(super) fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
