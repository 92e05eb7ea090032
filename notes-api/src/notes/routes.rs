use axum::{http::StatusCode, middleware};

use crate::{
    auth,
    ctx::BaseParams,
    openapi::{
        aide::{
            axum::{
                routing::{delete, get, patch, post, post_with},
                ApiRouter, IntoApiResponse,
            },
            NoApi,
        },
        Json,
    },
    state::AppState,
};

use super::{
    handlers, AddItem, CreateLabel, CreateNote, DeleteItem, DeleteLabel, EditItemName, EditLabel, EditNoteColor,
    EditNoteTitle, ItemsResponse, LabelResponse, LabelsResponse, NoteIdBody, NoteLabel, NoteResponse,
    NotesByLabelResponse, NotesResponse, ToggleItemStatus,
};

pub fn router(state: AppState) -> ApiRouter {
    let admin = ApiRouter::new()
        .api_route("/api/notes/all_notes", get(all_notes))
        .api_route("/api/notes/all_items", get(all_items))
        .api_route("/api/notes/all_labels", get(all_labels))
        .route_layer(middleware::from_fn(auth::middleware::require_admin));

    let user = ApiRouter::new()
        // notes
        .api_route("/api/notes/user", get(user_notes))
        .api_route("/api/notes/user/archived", get(archived_notes))
        .api_route(
            "/api/notes/user/create_note",
            post_with(create_note, |t| t.response::<201, Json<NoteResponse>>()),
        )
        .api_route("/api/notes/user/edit_note", patch(edit_note))
        .api_route("/api/notes/user/edit_note_color", patch(edit_note_color))
        .api_route("/api/notes/user/delete_note", delete(delete_note))
        .api_route("/api/notes/user/archive_note", patch(archive_note))
        .api_route("/api/notes/user/unarchive_note", patch(unarchive_note))
        // items
        .api_route("/api/notes/user/add_item", post(add_item))
        .api_route("/api/notes/user/edit_item", patch(edit_item))
        .api_route("/api/notes/user/toggle_status", patch(toggle_status))
        .api_route("/api/notes/user/delete_item", delete(delete_item))
        // labels
        .api_route("/api/notes/user/active_labels", get(active_labels))
        .api_route("/api/notes/user/labels", get(user_labels))
        .api_route("/api/notes/user/notes_by_label", get(notes_by_label))
        .api_route(
            "/api/notes/user/create_label",
            post_with(create_label, |t| t.response::<201, Json<LabelResponse>>()),
        )
        .api_route("/api/notes/user/add_label_to_note", patch(add_label_to_note))
        .api_route("/api/notes/user/remove_label_from_note", patch(remove_label_from_note))
        .api_route("/api/notes/user/edit_label", patch(edit_label))
        .api_route("/api/notes/user/delete_label", delete(delete_label))
        .route_layer(middleware::from_fn(auth::middleware::require_user));

    ApiRouter::new().merge(admin).merge(user).with_state(state)
}

// Notes

async fn all_notes(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_all_notes(base)
        .await
        .map(|notes| Json(NotesResponse::from(notes)))
}

async fn user_notes(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_user_notes(false, base)
        .await
        .map(|notes| Json(NotesResponse::from(notes)))
}

async fn archived_notes(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_user_notes(true, base)
        .await
        .map(|notes| Json(NotesResponse::from(notes)))
}

async fn create_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<CreateNote>) -> impl IntoApiResponse {
    handlers::create_note(args, base)
        .await
        .map(|note| (StatusCode::CREATED, Json(NoteResponse::from(note))))
}

async fn edit_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<EditNoteTitle>) -> impl IntoApiResponse {
    handlers::edit_note_title(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn edit_note_color(NoApi(base): NoApi<BaseParams>, Json(args): Json<EditNoteColor>) -> impl IntoApiResponse {
    handlers::edit_note_color(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn delete_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<NoteIdBody>) -> impl IntoApiResponse {
    handlers::delete_note(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn archive_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<NoteIdBody>) -> impl IntoApiResponse {
    handlers::set_note_archived(args, true, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn unarchive_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<NoteIdBody>) -> impl IntoApiResponse {
    handlers::set_note_archived(args, false, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

// Items

async fn all_items(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_all_items(base)
        .await
        .map(|items| Json(ItemsResponse::from(items)))
}

async fn add_item(NoApi(base): NoApi<BaseParams>, Json(args): Json<AddItem>) -> impl IntoApiResponse {
    handlers::add_item(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn edit_item(NoApi(base): NoApi<BaseParams>, Json(args): Json<EditItemName>) -> impl IntoApiResponse {
    handlers::edit_item_name(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn toggle_status(NoApi(base): NoApi<BaseParams>, Json(args): Json<ToggleItemStatus>) -> impl IntoApiResponse {
    handlers::set_item_status(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn delete_item(NoApi(base): NoApi<BaseParams>, Json(args): Json<DeleteItem>) -> impl IntoApiResponse {
    handlers::delete_item(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

// Labels

async fn all_labels(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_all_labels(base)
        .await
        .map(|labels| Json(LabelsResponse::from(labels)))
}

async fn active_labels(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_user_labels(true, base)
        .await
        .map(|labels| Json(LabelsResponse::from(labels)))
}

async fn user_labels(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_user_labels(false, base)
        .await
        .map(|labels| Json(LabelsResponse::from(labels)))
}

async fn notes_by_label(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_notes_by_label(base)
        .await
        .map(|groups| Json(NotesByLabelResponse::from(groups)))
}

async fn create_label(NoApi(base): NoApi<BaseParams>, Json(args): Json<CreateLabel>) -> impl IntoApiResponse {
    handlers::create_label(args, base)
        .await
        .map(|label| (StatusCode::CREATED, Json(LabelResponse::from(label))))
}

async fn add_label_to_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<NoteLabel>) -> impl IntoApiResponse {
    handlers::add_label_to_note(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn remove_label_from_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<NoteLabel>) -> impl IntoApiResponse {
    handlers::remove_label_from_note(args, base)
        .await
        .map(|note| Json(NoteResponse::from(note)))
}

async fn edit_label(NoApi(base): NoApi<BaseParams>, Json(args): Json<EditLabel>) -> impl IntoApiResponse {
    handlers::edit_label(args, base)
        .await
        .map(|label| Json(LabelResponse::from(label)))
}

async fn delete_label(NoApi(base): NoApi<BaseParams>, Json(args): Json<DeleteLabel>) -> impl IntoApiResponse {
    handlers::delete_label(args, base)
        .await
        .map(|label| Json(LabelResponse::from(label)))
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::{
        db::{init_test_db, DB},
        errors::ErrorResponse,
        notes::NoteView,
        tests::seed_user,
        users::UserRole,
        Result,
    };

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    async fn setup() -> Result<(DB, TestServer, HeaderValue)> {
        let db = init_test_db().await?;
        let (_, token) = seed_user(&db, "owner@mail.com", UserRole::Member).await?;
        let server = test_server(db.clone()).await?;
        Ok((db, server, bearer(&token)))
    }

    async fn create(server: &TestServer, auth: &HeaderValue, body: serde_json::Value) -> NoteView {
        let response = server
            .post("/api/notes/user/create_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&body)
            .await;
        assert_eq!(response.status_code(), 201);
        response.json::<NoteResponse>().note
    }

    #[tokio::test]
    async fn create_note_with_defaults() -> Result<()> {
        let (_, server, auth) = setup().await?;

        let note = create(&server, &auth, json!({})).await;

        assert_eq!(note.note.title, "No Title");
        assert_eq!(note.note.color, "gray");
        assert_eq!(note.items.len(), 1);
        assert_eq!(note.items[0].name, "No Item");
        assert!(!note.items[0].completed);
        assert_eq!(note.labels.len(), 1);
        assert_eq!(note.labels[0].label_name, "No Label");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_with_values() -> Result<()> {
        let (_, server, auth) = setup().await?;

        let note = create(
            &server,
            &auth,
            json!({ "title": "Groceries", "name": "milk", "color": "green", "label_name": "home" }),
        )
        .await;

        assert_eq!(note.note.title, "Groceries");
        assert_eq!(note.note.color, "green");
        assert_eq!(note.items[0].name, "milk");
        assert_eq!(note.labels[0].label_name, "home");
        Ok(())
    }

    #[tokio::test]
    async fn routes_require_user() -> Result<()> {
        let (_, server, _) = setup().await?;

        let response = server.get("/api/notes/user").expect_failure().await;
        assert_eq!(response.status_code(), 401);
        assert_eq!(response.json::<ErrorResponse>().name, "MissingUserError");

        let response = server
            .get("/api/notes/user")
            .add_header(AUTHORIZATION, bearer("unknown"))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 401);
        Ok(())
    }

    #[tokio::test]
    async fn admin_routes_reject_members() -> Result<()> {
        let (_, server, auth) = setup().await?;

        for path in ["/api/notes/all_notes", "/api/notes/all_items", "/api/notes/all_labels"] {
            let response = server.get(path).add_header(AUTHORIZATION, auth.clone()).expect_failure().await;
            assert_eq!(response.status_code(), 403);

            let error = response.json::<ErrorResponse>();
            assert_eq!(error.name, "UnauthorizedError");
            assert!(!error.success);
        }
        Ok(())
    }

    #[tokio::test]
    async fn admin_lists_everything() -> Result<()> {
        let (db, server, auth) = setup().await?;
        let (_, admin_token) = seed_user(&db, "admin@mail.com", UserRole::Admin).await?;
        let admin = bearer(&admin_token);

        let response = server
            .get("/api/notes/all_notes")
            .add_header(AUTHORIZATION, admin.clone())
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<ErrorResponse>().name, "NoNotesError");

        for (path, name) in [
            ("/api/notes/all_items", "NoItemsError"),
            ("/api/notes/all_labels", "NoLabelsError"),
        ] {
            let response = server
                .get(path)
                .add_header(AUTHORIZATION, admin.clone())
                .expect_failure()
                .await;
            assert_eq!(response.status_code(), 404);
            assert_eq!(response.json::<ErrorResponse>().name, name);
        }

        create(&server, &auth, json!({})).await;
        create(&server, &auth, json!({})).await;

        let response = server.get("/api/notes/all_notes").add_header(AUTHORIZATION, admin.clone()).await;
        assert_eq!(response.json::<NotesResponse>().notes.len(), 2);

        let response = server.get("/api/notes/all_items").add_header(AUTHORIZATION, admin.clone()).await;
        assert_eq!(response.json::<ItemsResponse>().items.len(), 2);

        let response = server.get("/api/notes/all_labels").add_header(AUTHORIZATION, admin).await;
        assert_eq!(response.json::<LabelsResponse>().labels.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn edit_note_returns_full_view() -> Result<()> {
        let (_, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({ "name": "milk" })).await;

        let response = server
            .patch("/api/notes/user/edit_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": note.note.id, "title": "Groceries v2" }))
            .await;
        let edited = response.json::<NoteResponse>().note;
        assert_eq!(edited.note.title, "Groceries v2");
        assert_eq!(edited.items, note.items);
        assert_eq!(edited.labels, note.labels);

        let response = server
            .patch("/api/notes/user/edit_note_color")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": note.note.id, "color": "blue" }))
            .await;
        let edited = response.json::<NoteResponse>().note;
        assert_eq!(edited.note.color, "blue");
        assert_eq!(edited.note.title, "Groceries v2");

        let response = server
            .patch("/api/notes/user/edit_note")
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "id": "018f6138-5b4f-722d-97c5-29b927cedbd4", "title": "x" }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        let error = response.json::<ErrorResponse>();
        assert_eq!(error.name, "NoteEditError");
        assert_eq!(error.message.as_deref(), Some("Note does not exist"));
        Ok(())
    }

    #[tokio::test]
    async fn archive_flag_round_trip() -> Result<()> {
        let (_, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({ "title": "old" })).await;

        let response = server
            .get("/api/notes/user/archived")
            .add_header(AUTHORIZATION, auth.clone())
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<ErrorResponse>().name, "NoNotesError");

        let response = server
            .patch("/api/notes/user/archive_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": note.note.id }))
            .await;
        assert!(response.json::<NoteResponse>().note.note.archived);

        // archived notes stay in the owner's list
        let response = server.get("/api/notes/user").add_header(AUTHORIZATION, auth.clone()).await;
        let notes = response.json::<NotesResponse>().notes;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].note.archived);

        let response = server
            .get("/api/notes/user/archived")
            .add_header(AUTHORIZATION, auth.clone())
            .await;
        assert_eq!(response.json::<NotesResponse>().notes[0].note.title, "old");

        let response = server
            .patch("/api/notes/user/unarchive_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": note.note.id }))
            .await;
        assert!(!response.json::<NoteResponse>().note.note.archived);

        let response = server.get("/api/notes/user").add_header(AUTHORIZATION, auth).await;
        assert_eq!(response.json::<NotesResponse>().notes.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_note_returns_snapshot() -> Result<()> {
        let (db, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({ "name": "milk" })).await;

        let response = server
            .delete("/api/notes/user/delete_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": note.note.id }))
            .await;
        let deleted = response.json::<NoteResponse>().note;
        assert_eq!(deleted.note.id, note.note.id);
        assert_eq!(deleted.items[0].name, "milk");
        assert_eq!(deleted.labels.len(), 1);

        let items = db
            .call(|conn| Ok(conn.query_row::<u32, _, _>("SELECT count(*) FROM items", [], |r| r.get(0))?))
            .await?;
        assert_eq!(items, 0);

        let response = server
            .delete("/api/notes/user/delete_note")
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "id": note.note.id }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<ErrorResponse>().name, "NoteDeleteError");
        Ok(())
    }

    #[tokio::test]
    async fn item_lifecycle() -> Result<()> {
        let (_, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({})).await;
        let note_id = note.note.id;

        let response = server
            .post("/api/notes/user/add_item")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "noteId": note_id, "name": "eggs" }))
            .await;
        let view = response.json::<NoteResponse>().note;
        assert_eq!(view.items.len(), 2);
        let item = view.items[1].clone();
        assert_eq!(item.name, "eggs");
        assert!(!item.completed);

        let response = server
            .patch("/api/notes/user/edit_item")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "id": item.id, "name": "bread", "noteId": note_id }))
            .await;
        assert_eq!(response.json::<NoteResponse>().note.items[1].name, "bread");

        for completed in [true, false] {
            let response = server
                .patch("/api/notes/user/toggle_status")
                .add_header(AUTHORIZATION, auth.clone())
                .json(&json!({ "id": item.id, "completed": completed, "noteId": note_id }))
                .await;
            assert_eq!(response.json::<NoteResponse>().note.items[1].completed, completed);
        }

        let response = server
            .delete("/api/notes/user/delete_item")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "itemId": item.id, "noteId": note_id }))
            .await;
        let view = response.json::<NoteResponse>().note;
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "No Item");

        let response = server
            .delete("/api/notes/user/delete_item")
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "itemId": item.id, "noteId": note_id }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<ErrorResponse>().name, "ItemDeleteError");
        Ok(())
    }

    #[tokio::test]
    async fn label_lifecycle() -> Result<()> {
        let (_, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({ "title": "labeled" })).await;
        let note_id = note.note.id;

        let response = server
            .post("/api/notes/user/create_label")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "label_name": "work" }))
            .await;
        assert_eq!(response.status_code(), 201);
        let label = response.json::<LabelResponse>().label;
        assert!(label.active);

        for _ in 0..2 {
            let response = server
                .patch("/api/notes/user/add_label_to_note")
                .add_header(AUTHORIZATION, auth.clone())
                .json(&json!({ "labelId": label.id, "noteId": note_id }))
                .await;
            assert_eq!(response.json::<NoteResponse>().note.labels.len(), 2);
        }

        let response = server
            .get("/api/notes/user/notes_by_label")
            .add_header(AUTHORIZATION, auth.clone())
            .await;
        let groups = response.json::<NotesByLabelResponse>().notes;
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|group| group.notes[0].note.title == "labeled"));

        let response = server
            .patch("/api/notes/user/edit_label")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "labelId": label.id, "label_name": "office", "active": false }))
            .await;
        let edited = response.json::<LabelResponse>().label;
        assert_eq!(edited.label_name, "office");
        assert!(!edited.active);

        let response = server
            .get("/api/notes/user/active_labels")
            .add_header(AUTHORIZATION, auth.clone())
            .await;
        assert_eq!(response.json::<LabelsResponse>().labels.len(), 1);

        let response = server
            .get("/api/notes/user/labels")
            .add_header(AUTHORIZATION, auth.clone())
            .await;
        assert_eq!(response.json::<LabelsResponse>().labels.len(), 2);

        let response = server
            .patch("/api/notes/user/remove_label_from_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "labelId": label.id, "noteId": note_id }))
            .await;
        assert_eq!(response.json::<NoteResponse>().note.labels.len(), 1);

        let response = server
            .patch("/api/notes/user/remove_label_from_note")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "labelId": label.id, "noteId": note_id }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<ErrorResponse>().name, "LabelRemoveError");

        let response = server
            .delete("/api/notes/user/delete_label")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "labelId": label.id }))
            .await;
        assert_eq!(response.json::<LabelResponse>().label.id, label.id);

        let response = server
            .delete("/api/notes/user/delete_label")
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "labelId": label.id }))
            .expect_failure()
            .await;
        assert_eq!(response.json::<ErrorResponse>().name, "LabelDeleteError");
        Ok(())
    }

    #[tokio::test]
    async fn missing_records_map_to_route_errors() -> Result<()> {
        let (_, server, auth) = setup().await?;
        let note = create(&server, &auth, json!({})).await;
        let missing = "018f6138-5b4f-722d-97c5-29b927cedbd4";

        let cases = [
            (
                server.post("/api/notes/user/add_item"),
                json!({ "id": missing, "name": "eggs" }),
                400,
                "ItemCreationError",
            ),
            (
                server.patch("/api/notes/user/add_label_to_note"),
                json!({ "labelId": missing, "noteId": note.note.id }),
                404,
                "LabelAddError",
            ),
            (
                server.patch("/api/notes/user/add_label_to_note"),
                json!({ "labelId": note.labels[0].id, "noteId": missing }),
                404,
                "LabelAddError",
            ),
            (
                server.patch("/api/notes/user/edit_label"),
                json!({ "labelId": missing, "label_name": "office" }),
                404,
                "LabelEditError",
            ),
            (
                server.patch("/api/notes/user/edit_label"),
                json!({ "labelId": note.labels[0].id }),
                404,
                "LabelEditError",
            ),
        ];

        for (request, body, status, name) in cases {
            let response = request
                .add_header(AUTHORIZATION, auth.clone())
                .json(&body)
                .expect_failure()
                .await;
            assert_eq!(response.status_code(), status);
            assert_eq!(response.json::<ErrorResponse>().name, name);
        }
        Ok(())
    }

    #[tokio::test]
    async fn foreign_note_is_forbidden_but_admin_passes() -> Result<()> {
        let (db, server, auth) = setup().await?;
        let (_, intruder) = seed_user(&db, "intruder@mail.com", UserRole::Member).await?;
        let (_, admin) = seed_user(&db, "admin@mail.com", UserRole::Admin).await?;
        let note = create(&server, &auth, json!({})).await;

        let response = server
            .patch("/api/notes/user/edit_note")
            .add_header(AUTHORIZATION, bearer(&intruder))
            .json(&json!({ "id": note.note.id, "title": "mine now" }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 403);
        assert_eq!(response.json::<ErrorResponse>().name, "ForbiddenError");

        let response = server
            .patch("/api/notes/user/edit_note")
            .add_header(AUTHORIZATION, bearer(&admin))
            .json(&json!({ "id": note.note.id, "title": "moderated" }))
            .await;
        assert_eq!(response.json::<NoteResponse>().note.note.title, "moderated");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_validation_error() -> Result<()> {
        let (_, server, auth) = setup().await?;

        let response = server
            .patch("/api/notes/user/edit_note")
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "id": "not-a-uuid", "title": "x" }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<ErrorResponse>().name, "ValidationError");
        Ok(())
    }

    async fn test_server(db: DB) -> Result<TestServer> {
        crate::tests::test_server(db, super::router).await
    }
}
