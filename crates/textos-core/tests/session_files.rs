use pretty_assertions::assert_eq;
use tempfile::tempdir;
use textos_core::{
    AppSettings, CharCountRule, EditorSession, FormattingSettings, FsDocumentStore, SessionOutcome,
    Theme, ViewMode,
};

#[test]
fn test_open_edit_save_through_filesystem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("letter.txt");
    std::fs::write(&path, "Dear reader,\r\nhello").unwrap();

    let store = FsDocumentStore::new().with_open_path(&path);
    let mut session = EditorSession::new(store, AppSettings::default());
    assert_eq!(session.open(false).unwrap(), SessionOutcome::Done);
    assert_eq!(session.surface().document_text(), "Dear reader,\nhello");

    assert!(session.edit_page(0, "Dear reader,\nhello!", 19));
    let status = session.status();
    assert!(status.is_dirty);
    assert_eq!(status.file_name, "letter.txt");
    assert_eq!(status.char_count, 19);

    assert_eq!(session.save().unwrap(), SessionOutcome::Done);
    assert!(!session.has_unsaved_changes());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Dear reader,\r\nhello!"
    );
}

#[test]
fn test_save_as_writes_chosen_path() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("new.md");

    let mut session = EditorSession::new(FsDocumentStore::new(), AppSettings::default());
    session.edit_page(0, "# Title", 7);
    assert_eq!(session.save().unwrap(), SessionOutcome::Cancelled);

    session.store_mut().set_save_as_path(Some(target.clone()));
    assert_eq!(session.save_as().unwrap(), SessionOutcome::Done);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Title");
    assert_eq!(session.document().path(), Some(target.as_path()));
}

#[test]
fn test_open_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let store = FsDocumentStore::new().with_open_path(dir.path().join("missing.txt"));
    let mut session = EditorSession::new(store, AppSettings::default());
    assert!(session.open(false).is_err());
    assert_eq!(session.document().content(), "");
}

#[test]
fn test_settings_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = AppSettings {
        theme: Theme::Dark,
        default_view: ViewMode::Editor,
        formatting: FormattingSettings::new("Georgia", 14, 1.25),
        char_count_rule: CharCountRule::WithoutSpaces,
        last_opened_file: Some(dir.path().join("a.txt")),
    };
    settings.save(&path).unwrap();

    assert_eq!(AppSettings::load(&path).unwrap(), settings);
}

#[test]
fn test_broken_settings_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ this is not json").unwrap();
    assert_eq!(AppSettings::load_or_default(&path), AppSettings::default());
    assert_eq!(
        AppSettings::load_or_default(&dir.path().join("absent.json")),
        AppSettings::default()
    );
}

#[test]
fn test_session_persists_formatting_in_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut session = EditorSession::new(FsDocumentStore::new(), AppSettings::default());
    session.set_formatting("Consolas", 16, 1.0);
    session.save_settings(&path).unwrap();

    let loaded = AppSettings::load(&path).unwrap();
    assert_eq!(loaded.formatting.font_family(), "Consolas");
    assert_eq!(loaded.formatting.font_size(), 16);
    assert_eq!(loaded.formatting.line_height(), 1.0);

    let session = EditorSession::new(FsDocumentStore::new(), loaded);
    assert_eq!(session.surface().formatting().font_size(), 16);
}
