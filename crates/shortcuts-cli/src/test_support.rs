//! Fixture database and context shared by the tool and server tests.

use crate::context::ToolContext;
use rusqlite::{params, Connection};
use shortcuts_core::config::{CatalogPaths, Config};
use std::path::Path;
use tempfile::TempDir;

pub const MORNING_XML: &str = r#"<plist><dict>
    <key>WFWorkflowActions</key><array>
        <dict><key>WFWorkflowActionIdentifier</key><string>is.workflow.actions.gettext</string>
              <key>WFWorkflowActionParameters</key><dict><key>WFTextActionText</key><string>Good Morning</string></dict></dict>
        <dict><key>WFWorkflowActionIdentifier</key><string>is.workflow.actions.showresult</string></dict>
        <dict><key>WFWorkflowActionIdentifier</key><string>com.example.Weather.Forecast</string></dict>
    </array>
    <key>WFWorkflowInputContentItemClasses</key><array><string>WFStringContentItem</string></array>
</dict></plist>"#;

pub fn write_fixture_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE ZSHORTCUT (Z_PK INTEGER PRIMARY KEY, ZNAME TEXT, ZACTIONCOUNT INTEGER,
                                 ZMODIFICATIONDATE REAL, ZWORKFLOWID BLOB);
         CREATE TABLE ZSHORTCUTACTIONS (Z_PK INTEGER PRIMARY KEY, ZSHORTCUT INTEGER, ZDATA BLOB);
         CREATE TABLE ZCOLLECTION (Z_PK INTEGER PRIMARY KEY, ZIDENTIFIER TEXT,
                                   ZTEMPORARYSYNCFOLDERNAME TEXT);
         INSERT INTO ZSHORTCUT VALUES (1, 'Morning Routine', 3, 0, 'morning-id');
         INSERT INTO ZSHORTCUT VALUES (2, 'Empty', 0, 86400, NULL);
         INSERT INTO ZCOLLECTION VALUES (1, 'root', NULL);
         INSERT INTO ZCOLLECTION VALUES (2, 'share', 'Share Sheet');",
    )
    .unwrap();
    conn.execute(
        "INSERT INTO ZSHORTCUTACTIONS VALUES (1, 1, ?1)",
        params![MORNING_XML.as_bytes()],
    )
    .unwrap();
}

/// A context over a fixture database whose catalog scans only paths inside
/// the temp dir.
pub fn fixture_context() -> (TempDir, ToolContext) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("Shortcuts.sqlite");
    write_fixture_db(&db_path);

    let curated = dir.path().join("curated.json");
    std::fs::write(
        &curated,
        serde_json::to_string(&serde_json::json!({
            "actions": {
                "is.workflow.actions.gettext": {
                    "title": "Text",
                    "description": "Passes text to the next action.",
                    "category": "Text",
                    "parameters": [
                        {"name": "WFTextActionText", "value_type": "string", "is_optional": false}
                    ]
                }
            }
        }))
        .unwrap(),
    )
    .unwrap();

    let config = Config {
        db_path,
        default_timeout_secs: 5,
        log_level: "INFO".to_string(),
        catalog: CatalogPaths {
            system_root: dir.path().join("system"),
            apps_root: dir.path().join("apps"),
            curated_file: Some(curated),
        },
    };
    (dir, ToolContext::new(config))
}
