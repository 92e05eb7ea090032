use rusqlite::Connection;

use crate::{
    ctx::{BaseParams, User},
    db::tokio_rusqlite,
    Error, Result,
};

use super::{
    gateway::{self, LabelFilter, NoteFilter},
    model::or_default,
    AddItem, CreateLabel, CreateNote, DeleteItem, DeleteLabel, EditItemName, EditLabel, EditNoteColor, EditNoteTitle,
    Item, ItemId, Label, LabelId, LabelNotes, Note, NoteId, NoteIdBody, NoteLabel, NoteView, ToggleItemStatus,
    DEFAULT_COLOR, DEFAULT_ITEM_NAME, DEFAULT_LABEL_NAME, DEFAULT_TITLE,
};

const NOTE_MISSING: &str = "Note does not exist";
const ITEM_MISSING: &str = "Item does not exist";
const LABEL_MISSING: &str = "Label does not exist";

/// The note, provided the caller may touch it.
fn owned_note(
    conn: &Connection,
    user: &User,
    id: NoteId,
    missing: impl FnOnce(String) -> Error,
) -> tokio_rusqlite::Result<Note> {
    let note = gateway::find_note(conn, id)?.ok_or_else(|| missing(NOTE_MISSING.into()))?;
    if !user.can_access(note.user_id) {
        return Err(Error::Forbidden("You do not own this note".into()).into());
    }
    Ok(note)
}

/// The item, provided it belongs to `note_id` and the caller may touch that note.
fn owned_item(
    conn: &Connection,
    user: &User,
    id: ItemId,
    note_id: NoteId,
    missing: impl Fn(String) -> Error,
) -> tokio_rusqlite::Result<Item> {
    let item = gateway::find_item(conn, id)?
        .filter(|item| item.note_id == note_id)
        .ok_or_else(|| missing(ITEM_MISSING.into()))?;
    owned_note(conn, user, note_id, missing)?;
    Ok(item)
}

fn owned_label(
    conn: &Connection,
    user: &User,
    id: LabelId,
    missing: impl FnOnce(String) -> Error,
) -> tokio_rusqlite::Result<Label> {
    let label = gateway::find_label(conn, id)?.ok_or_else(|| missing(LABEL_MISSING.into()))?;
    if !user.can_access(label.user_id) {
        return Err(Error::Forbidden("You do not own this label".into()).into());
    }
    Ok(label)
}

/// Constraint failures on insert are reported as `creation`, everything else passes through.
fn creation_error(error: tokio_rusqlite::Error, creation: impl FnOnce(String) -> Error, message: &str) -> Error {
    match Error::from(error) {
        Error::DB(e) if e.is_constraint_violation() => creation(message.into()),
        error => error,
    }
}

// Notes

pub async fn find_all_notes(BaseParams { db, ctx }: BaseParams) -> Result<Vec<NoteView>> {
    ctx.require_admin()?;

    let notes = db
        .call(|conn| {
            let tx = conn.transaction()?;
            let notes = gateway::select_notes(&tx, NoteFilter::default())?;
            Ok(gateway::note_views(&tx, notes)?)
        })
        .await?;

    if notes.is_empty() {
        return Err(Error::NoNotes("There are no notes in the database".into()));
    }
    Ok(notes)
}

/// All of the caller's notes, or only the archived ones.
pub async fn find_user_notes(only_archived: bool, BaseParams { db, ctx }: BaseParams) -> Result<Vec<NoteView>> {
    let user_id = ctx.require_user()?.id;

    let notes = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let notes = gateway::select_notes(
                &tx,
                NoteFilter {
                    user_id: Some(user_id),
                    archived: only_archived.then_some(true),
                },
            )?;
            Ok(gateway::note_views(&tx, notes)?)
        })
        .await?;

    if notes.is_empty() {
        let message = if only_archived {
            "You have no archived notes"
        } else {
            "You have no notes"
        };
        return Err(Error::NoNotes(message.into()));
    }
    Ok(notes)
}

pub async fn create_note(args: CreateNote, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user_id = ctx.require_user()?.id;

    let CreateNote {
        title,
        name,
        color,
        label_name,
    } = args;
    let title = or_default(title, DEFAULT_TITLE);
    let color = or_default(color, DEFAULT_COLOR);
    let name = or_default(name, DEFAULT_ITEM_NAME);
    let label_name = or_default(label_name, DEFAULT_LABEL_NAME);

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let note = gateway::insert_note(&tx, user_id, &title, &color)?;
            gateway::insert_item(&tx, note.id, &name)?;
            let label = gateway::insert_label(&tx, user_id, &label_name)?;
            gateway::attach_label(&tx, note.id, label.id)?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await
        .map_err(|e| creation_error(e, Error::NoteCreation, "Note could not be created"))?;

    tracing::info!(note_id = %note.note.id, %user_id, "note created");

    Ok(note)
}

pub async fn edit_note_title(args: EditNoteTitle, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let EditNoteTitle { id, title } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_note(&tx, &user, id, Error::NoteEdit)?;
            let note = gateway::update_note_title(&tx, id, &title)?
                .ok_or_else(|| Error::NoteEdit(NOTE_MISSING.into()))?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(note_id = %id, "note title edited");

    Ok(note)
}

pub async fn edit_note_color(args: EditNoteColor, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let EditNoteColor { id, color } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_note(&tx, &user, id, Error::NoteEdit)?;
            let note = gateway::update_note_color(&tx, id, &color)?
                .ok_or_else(|| Error::NoteEdit(NOTE_MISSING.into()))?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(note_id = %id, "note color edited");

    Ok(note)
}

/// Returns the note as it was right before deletion.
pub async fn delete_note(NoteIdBody { id }: NoteIdBody, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();

    let snapshot = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let note = owned_note(&tx, &user, id, Error::NoteDelete)?;
            let snapshot = gateway::note_view(&tx, note)?;
            gateway::delete_note(&tx, id)?.ok_or_else(|| Error::NoteDelete(NOTE_MISSING.into()))?;
            tx.commit()?;
            Ok(snapshot)
        })
        .await?;

    tracing::info!(note_id = %id, "note deleted");

    Ok(snapshot)
}

pub async fn set_note_archived(
    NoteIdBody { id }: NoteIdBody,
    archived: bool,
    BaseParams { db, ctx }: BaseParams,
) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let error = if archived {
        Error::NoteArchive
    } else {
        Error::NoteUnarchive
    };

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_note(&tx, &user, id, error)?;
            let note = gateway::set_note_archived(&tx, id, archived)?.ok_or_else(|| error(NOTE_MISSING.into()))?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(note_id = %id, archived, "note archive flag changed");

    Ok(note)
}

// Items

pub async fn find_all_items(BaseParams { db, ctx }: BaseParams) -> Result<Vec<Item>> {
    ctx.require_admin()?;

    let items = db.call(|conn| Ok(gateway::select_items(conn)?)).await?;

    if items.is_empty() {
        return Err(Error::NoItems("There are no items in the database".into()));
    }
    Ok(items)
}

pub async fn add_item(args: AddItem, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let AddItem { id: note_id, name } = args;

    let name = name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::ItemCreation("Item name is required".into()))?;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let note = owned_note(&tx, &user, note_id, Error::ItemCreation)?;
            gateway::insert_item(&tx, note_id, &name)?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await
        .map_err(|e| creation_error(e, Error::ItemCreation, "Item could not be created"))?;

    tracing::info!(%note_id, "item added");

    Ok(note)
}

pub async fn edit_item_name(args: EditItemName, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let EditItemName { id, name, note_id } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_item(&tx, &user, id, note_id, Error::ItemEdit)?;
            gateway::update_item_name(&tx, id, &name)?.ok_or_else(|| Error::ItemEdit(ITEM_MISSING.into()))?;

            let view = gateway::find_note_view(&tx, note_id)?.ok_or_else(|| Error::ItemEdit(NOTE_MISSING.into()))?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(item_id = %id, %note_id, "item renamed");

    Ok(note)
}

/// Stores `completed` as sent; the client flips the value it last saw.
pub async fn set_item_status(args: ToggleItemStatus, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let ToggleItemStatus { id, completed, note_id } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_item(&tx, &user, id, note_id, Error::ItemEdit)?;
            gateway::update_item_status(&tx, id, completed)?.ok_or_else(|| Error::ItemEdit(ITEM_MISSING.into()))?;

            let view = gateway::find_note_view(&tx, note_id)?.ok_or_else(|| Error::ItemEdit(NOTE_MISSING.into()))?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(item_id = %id, %note_id, completed, "item status changed");

    Ok(note)
}

pub async fn delete_item(args: DeleteItem, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let DeleteItem { item_id, note_id } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_item(&tx, &user, item_id, note_id, Error::ItemDelete)?;
            gateway::delete_item(&tx, item_id)?.ok_or_else(|| Error::ItemDelete(ITEM_MISSING.into()))?;

            let view =
                gateway::find_note_view(&tx, note_id)?.ok_or_else(|| Error::ItemDelete(NOTE_MISSING.into()))?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(%item_id, %note_id, "item deleted");

    Ok(note)
}

// Labels

pub async fn find_all_labels(BaseParams { db, ctx }: BaseParams) -> Result<Vec<Label>> {
    ctx.require_admin()?;

    let labels = db
        .call(|conn| Ok(gateway::select_labels(conn, LabelFilter::default())?))
        .await?;

    if labels.is_empty() {
        return Err(Error::NoLabels("There are no labels in the database".into()));
    }
    Ok(labels)
}

/// Caller's labels, optionally only the active ones.
pub async fn find_user_labels(only_active: bool, BaseParams { db, ctx }: BaseParams) -> Result<Vec<Label>> {
    let user_id = ctx.require_user()?.id;
    let filter = LabelFilter {
        user_id: Some(user_id),
        active: only_active.then_some(true),
    };

    let labels = db.call(move |conn| Ok(gateway::select_labels(conn, filter)?)).await?;

    if labels.is_empty() {
        let message = if only_active {
            "You have no active labels"
        } else {
            "You have no labels"
        };
        return Err(Error::NoLabels(message.into()));
    }
    Ok(labels)
}

pub async fn find_notes_by_label(BaseParams { db, ctx }: BaseParams) -> Result<Vec<LabelNotes>> {
    let user_id = ctx.require_user()?.id;

    let groups = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            Ok(gateway::label_groups(&tx, user_id)?)
        })
        .await?;

    if groups.is_empty() {
        return Err(Error::NoNotes("You have no labeled notes".into()));
    }
    Ok(groups)
}

pub async fn create_label(args: CreateLabel, BaseParams { db, ctx }: BaseParams) -> Result<Label> {
    let user_id = ctx.require_user()?.id;

    let label_name = args
        .label_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::LabelCreation("Label name is required".into()))?;

    let label = db
        .call(move |conn| Ok(gateway::insert_label(conn, user_id, &label_name)?))
        .await
        .map_err(|e| creation_error(e, Error::LabelCreation, "Label could not be created"))?;

    tracing::info!(label_id = %label.id, %user_id, "label created");

    Ok(label)
}

pub async fn add_label_to_note(args: NoteLabel, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let NoteLabel { label_id, note_id } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let note = owned_note(&tx, &user, note_id, Error::LabelAdd)?;
            owned_label(&tx, &user, label_id, Error::LabelAdd)?;
            gateway::attach_label(&tx, note_id, label_id)?;

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(%label_id, %note_id, "label added to note");

    Ok(note)
}

pub async fn remove_label_from_note(args: NoteLabel, BaseParams { db, ctx }: BaseParams) -> Result<NoteView> {
    let user = ctx.require_user()?.clone();
    let NoteLabel { label_id, note_id } = args;

    let note = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let note = owned_note(&tx, &user, note_id, Error::LabelRemove)?;
            owned_label(&tx, &user, label_id, Error::LabelRemove)?;
            if !gateway::detach_label(&tx, note_id, label_id)? {
                return Err(Error::LabelRemove("Label is not attached to this note".into()).into());
            }

            let view = gateway::note_view(&tx, note)?;
            tx.commit()?;
            Ok(view)
        })
        .await?;

    tracing::info!(%label_id, %note_id, "label removed from note");

    Ok(note)
}

pub async fn edit_label(args: EditLabel, BaseParams { db, ctx }: BaseParams) -> Result<Label> {
    let user = ctx.require_user()?.clone();
    let EditLabel {
        label_id,
        label_name,
        active,
    } = args;
    let label_name = label_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty());
    if label_name.is_none() && active.is_none() {
        return Err(Error::LabelEdit("Nothing to edit".into()));
    }

    let label = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_label(&tx, &user, label_id, Error::LabelEdit)?;
            let label = gateway::update_label(&tx, label_id, label_name.as_deref(), active)?
                .ok_or_else(|| Error::LabelEdit(LABEL_MISSING.into()))?;
            tx.commit()?;
            Ok(label)
        })
        .await?;

    tracing::info!(%label_id, "label edited");

    Ok(label)
}

pub async fn delete_label(DeleteLabel { label_id }: DeleteLabel, BaseParams { db, ctx }: BaseParams) -> Result<Label> {
    let user = ctx.require_user()?.clone();

    let label = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            owned_label(&tx, &user, label_id, Error::LabelDelete)?;
            let label =
                gateway::delete_label(&tx, label_id)?.ok_or_else(|| Error::LabelDelete(LABEL_MISSING.into()))?;
            tx.commit()?;
            Ok(label)
        })
        .await?;

    tracing::info!(%label_id, "label deleted");

    Ok(label)
}
