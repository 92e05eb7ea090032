use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![
        M::up(
            r#"
            CREATE TABLE users (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                email TEXT NOT NULL UNIQUE,

                role TEXT NOT NULL DEFAULT 'member', -- admin | member | guest
                password TEXT,
                access_token TEXT UNIQUE,

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE notes (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                user_id BLOB NOT NULL CHECK(length(user_id) = 16),

                title TEXT NOT NULL DEFAULT 'No Title',
                color TEXT NOT NULL DEFAULT 'gray',
                archived INTEGER NOT NULL DEFAULT 0,

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME,

                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            CREATE INDEX notes_user_id_idx ON notes (user_id);
        "#
        ),
        M::up(
            r#"
            CREATE TABLE items (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                note_id BLOB NOT NULL CHECK(length(note_id) = 16),

                name TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME,

                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE
            );
            CREATE INDEX items_note_id_idx ON items (note_id);
        "#
        ),
        M::up(
            r#"
            CREATE TABLE labels (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                user_id BLOB NOT NULL CHECK(length(user_id) = 16),

                label_name TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME,

                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            CREATE INDEX labels_user_id_idx ON labels (user_id);

            CREATE TABLE notes_labels (
                note_id BLOB NOT NULL,
                label_id BLOB NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,

                PRIMARY KEY (note_id, label_id),
                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE,
                FOREIGN KEY (label_id) REFERENCES labels (id) ON DELETE CASCADE
            );
            CREATE INDEX notes_labels_label_id_idx ON notes_labels (label_id);
        "#
        ),
    ]);
}
