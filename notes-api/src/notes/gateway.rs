//! Persistence primitives for notes, items, labels and their associations.
//!
//! Everything here is synchronous and runs on the connection thread inside a
//! `Connection::call` closure, so a handler can compose several primitives in
//! one transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};
use sea_query::{Expr, Iden, Order, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;

use crate::users::UserId;

use super::{Item, ItemId, Label, LabelId, LabelNotes, Note, NoteId, NoteView};

#[derive(Iden, Clone, Copy)]
pub enum Notes {
    Table,
    Id,
    UserId,
    Title,
    Color,
    Archived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Labels {
    Table,
    Id,
    UserId,
    LabelName,
    Active,
    CreatedAt,
    UpdatedAt,
}

const NOTE_COLUMNS: [Notes; 7] = {
    use Notes::*;
    [Id, UserId, Title, Color, Archived, CreatedAt, UpdatedAt]
};

const LABEL_COLUMNS: [Labels; 6] = {
    use Labels::*;
    [Id, UserId, LabelName, Active, CreatedAt, UpdatedAt]
};

const NOTE_SELECT: &str = "id, user_id, title, color, archived, created_at, updated_at";
const ITEM_SELECT: &str = "id, note_id, name, completed, created_at, updated_at";
const LABEL_SELECT: &str = "id, user_id, label_name, active, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            color: row.get(3)?,
            archived: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl<'a> TryFrom<&Row<'a>> for Item {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            note_id: row.get(1)?,
            name: row.get(2)?,
            completed: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl<'a> TryFrom<&Row<'a>> for Label {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            label_name: row.get(2)?,
            active: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

// Notes

#[derive(Debug, Default, Clone, Copy)]
pub struct NoteFilter {
    pub user_id: Option<UserId>,
    pub archived: Option<bool>,
}

pub fn select_notes(conn: &Connection, filter: NoteFilter) -> rusqlite::Result<Vec<Note>> {
    let (sql, values) = Query::select()
        .columns(NOTE_COLUMNS)
        .from(Notes::Table)
        .apply_if(filter.user_id, |q, user_id| {
            // ids are stored as 16-byte blobs
            q.and_where(Expr::col(Notes::UserId).eq(user_id.as_bytes().to_vec()));
        })
        .apply_if(filter.archived, |q, archived| {
            q.and_where(Expr::col(Notes::Archived).eq(archived));
        })
        .order_by_expr(Expr::cust("rowid"), Order::Asc)
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = conn.prepare(&sql)?;
    let notes = stmt
        .query_map(&*values.as_params(), |row| Note::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

pub fn find_note(conn: &Connection, id: NoteId) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("SELECT {NOTE_SELECT} FROM notes WHERE id = ?"),
        params![id],
        |row| Note::try_from(row),
    )
    .optional()
}

pub fn insert_note(conn: &Connection, user_id: UserId, title: &str, color: &str) -> rusqlite::Result<Note> {
    conn.query_row(
        &format!("INSERT INTO notes (user_id, title, color) VALUES (?, ?, ?) RETURNING {NOTE_SELECT}"),
        params![user_id, title, color],
        |row| Note::try_from(row),
    )
}

pub fn update_note_title(conn: &Connection, id: NoteId, title: &str) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("UPDATE notes SET title = ?, updated_at = ? WHERE id = ? RETURNING {NOTE_SELECT}"),
        params![title, chrono::Utc::now(), id],
        |row| Note::try_from(row),
    )
    .optional()
}

pub fn update_note_color(conn: &Connection, id: NoteId, color: &str) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("UPDATE notes SET color = ?, updated_at = ? WHERE id = ? RETURNING {NOTE_SELECT}"),
        params![color, chrono::Utc::now(), id],
        |row| Note::try_from(row),
    )
    .optional()
}

pub fn set_note_archived(conn: &Connection, id: NoteId, archived: bool) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("UPDATE notes SET archived = ?, updated_at = ? WHERE id = ? RETURNING {NOTE_SELECT}"),
        params![archived, chrono::Utc::now(), id],
        |row| Note::try_from(row),
    )
    .optional()
}

/// Items and label links go with the note (`ON DELETE CASCADE`).
pub fn delete_note(conn: &Connection, id: NoteId) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("DELETE FROM notes WHERE id = ? RETURNING {NOTE_SELECT}"),
        params![id],
        |row| Note::try_from(row),
    )
    .optional()
}

/// The note with its current items and labels.
pub fn note_view(conn: &Connection, note: Note) -> rusqlite::Result<NoteView> {
    let items = items_by_note(conn, note.id)?;
    let labels = labels_by_note(conn, note.id)?;
    Ok(NoteView { note, items, labels })
}

pub fn find_note_view(conn: &Connection, id: NoteId) -> rusqlite::Result<Option<NoteView>> {
    find_note(conn, id)?.map(|note| note_view(conn, note)).transpose()
}

pub fn note_views(conn: &Connection, notes: Vec<Note>) -> rusqlite::Result<Vec<NoteView>> {
    notes.into_iter().map(|note| note_view(conn, note)).collect()
}

// Items

pub fn select_items(conn: &Connection) -> rusqlite::Result<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("SELECT {ITEM_SELECT} FROM items ORDER BY rowid"))?;
    let items = stmt
        .query_map([], |row| Item::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

pub fn items_by_note(conn: &Connection, note_id: NoteId) -> rusqlite::Result<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("SELECT {ITEM_SELECT} FROM items WHERE note_id = ? ORDER BY rowid"))?;
    let items = stmt
        .query_map(params![note_id], |row| Item::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

pub fn find_item(conn: &Connection, id: ItemId) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_SELECT} FROM items WHERE id = ?"),
        params![id],
        |row| Item::try_from(row),
    )
    .optional()
}

/// New items always start uncompleted.
pub fn insert_item(conn: &Connection, note_id: NoteId, name: &str) -> rusqlite::Result<Item> {
    conn.query_row(
        &format!("INSERT INTO items (note_id, name, completed) VALUES (?, ?, 0) RETURNING {ITEM_SELECT}"),
        params![note_id, name],
        |row| Item::try_from(row),
    )
}

pub fn update_item_name(conn: &Connection, id: ItemId, name: &str) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        &format!("UPDATE items SET name = ?, updated_at = ? WHERE id = ? RETURNING {ITEM_SELECT}"),
        params![name, chrono::Utc::now(), id],
        |row| Item::try_from(row),
    )
    .optional()
}

pub fn update_item_status(conn: &Connection, id: ItemId, completed: bool) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        &format!("UPDATE items SET completed = ?, updated_at = ? WHERE id = ? RETURNING {ITEM_SELECT}"),
        params![completed, chrono::Utc::now(), id],
        |row| Item::try_from(row),
    )
    .optional()
}

pub fn delete_item(conn: &Connection, id: ItemId) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        &format!("DELETE FROM items WHERE id = ? RETURNING {ITEM_SELECT}"),
        params![id],
        |row| Item::try_from(row),
    )
    .optional()
}

// Labels

#[derive(Debug, Default, Clone, Copy)]
pub struct LabelFilter {
    pub user_id: Option<UserId>,
    pub active: Option<bool>,
}

pub fn select_labels(conn: &Connection, filter: LabelFilter) -> rusqlite::Result<Vec<Label>> {
    let (sql, values) = Query::select()
        .columns(LABEL_COLUMNS)
        .from(Labels::Table)
        .apply_if(filter.user_id, |q, user_id| {
            q.and_where(Expr::col(Labels::UserId).eq(user_id.as_bytes().to_vec()));
        })
        .apply_if(filter.active, |q, active| {
            q.and_where(Expr::col(Labels::Active).eq(active));
        })
        .order_by_expr(Expr::cust("rowid"), Order::Asc)
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = conn.prepare(&sql)?;
    let labels = stmt
        .query_map(&*values.as_params(), |row| Label::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(labels)
}

pub fn labels_by_note(conn: &Connection, note_id: NoteId) -> rusqlite::Result<Vec<Label>> {
    let mut stmt = conn.prepare(
        r#"SELECT l.id, l.user_id, l.label_name, l.active, l.created_at, l.updated_at
        FROM labels l
        JOIN notes_labels nl ON nl.label_id = l.id
        WHERE nl.note_id = ?
        ORDER BY nl.rowid"#,
    )?;
    let labels = stmt
        .query_map(params![note_id], |row| Label::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(labels)
}

pub fn find_label(conn: &Connection, id: LabelId) -> rusqlite::Result<Option<Label>> {
    conn.query_row(
        &format!("SELECT {LABEL_SELECT} FROM labels WHERE id = ?"),
        params![id],
        |row| Label::try_from(row),
    )
    .optional()
}

pub fn insert_label(conn: &Connection, user_id: UserId, label_name: &str) -> rusqlite::Result<Label> {
    conn.query_row(
        &format!("INSERT INTO labels (user_id, label_name) VALUES (?, ?) RETURNING {LABEL_SELECT}"),
        params![user_id, label_name],
        |row| Label::try_from(row),
    )
}

/// `None` fields are left untouched.
pub fn update_label(
    conn: &Connection,
    id: LabelId,
    label_name: Option<&str>,
    active: Option<bool>,
) -> rusqlite::Result<Option<Label>> {
    conn.query_row(
        &format!(
            r#"UPDATE labels SET label_name = coalesce(?, label_name), active = coalesce(?, active), updated_at = ?
            WHERE id = ?
            RETURNING {LABEL_SELECT}"#
        ),
        params![label_name, active, chrono::Utc::now(), id],
        |row| Label::try_from(row),
    )
    .optional()
}

/// Links to notes go with the label (`ON DELETE CASCADE`).
pub fn delete_label(conn: &Connection, id: LabelId) -> rusqlite::Result<Option<Label>> {
    conn.query_row(
        &format!("DELETE FROM labels WHERE id = ? RETURNING {LABEL_SELECT}"),
        params![id],
        |row| Label::try_from(row),
    )
    .optional()
}

/// Linking an already linked pair is a no-op.
pub fn attach_label(conn: &Connection, note_id: NoteId, label_id: LabelId) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO notes_labels (note_id, label_id) VALUES (?, ?)",
        params![note_id, label_id],
    )?;
    Ok(())
}

/// `false` when the pair was not linked.
pub fn detach_label(conn: &Connection, note_id: NoteId, label_id: LabelId) -> rusqlite::Result<bool> {
    let removed = conn.execute(
        "DELETE FROM notes_labels WHERE note_id = ? AND label_id = ?",
        params![note_id, label_id],
    )?;
    Ok(removed > 0)
}

pub fn notes_by_label(conn: &Connection, label_id: LabelId) -> rusqlite::Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        r#"SELECT n.id, n.user_id, n.title, n.color, n.archived, n.created_at, n.updated_at
        FROM notes n
        JOIN notes_labels nl ON nl.note_id = n.id
        WHERE nl.label_id = ?
        ORDER BY n.rowid"#,
    )?;
    let notes = stmt
        .query_map(params![label_id], |row| Note::try_from(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

/// The user's labels that are attached to at least one note, each with those notes.
pub fn label_groups(conn: &Connection, user_id: UserId) -> rusqlite::Result<Vec<LabelNotes>> {
    let labels = select_labels(
        conn,
        LabelFilter {
            user_id: Some(user_id),
            ..Default::default()
        },
    )?;

    let mut groups = Vec::with_capacity(labels.len());
    for label in labels {
        let notes = notes_by_label(conn, label.id)?;
        if notes.is_empty() {
            continue;
        }
        groups.push(LabelNotes {
            label,
            notes: note_views(conn, notes)?,
        });
    }
    Ok(groups)
}
