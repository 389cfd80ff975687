use std::sync::{Arc, Mutex};
use textos_core::{Color, PagePosition, PagedEditor, ReconcileState, SurfaceEvent};

fn two_page_text() -> String {
    let mut lines = vec!["line"; 41];
    lines.push("last");
    lines.join("\n")
}

#[test]
fn test_overflow_reconciles_and_restores_caret() {
    let mut editor = PagedEditor::default();
    editor.set_document_text(&two_page_text());
    editor.set_caret(1, 2);
    let caret = editor.caret_offset();
    let version = editor.version();

    editor.report_measured_page_height(0, 1500.0);
    assert_eq!(editor.pending_idle_tasks(), 1);

    // Tick 1: overflow detected, document re-paginated, caret restore queued.
    assert_eq!(editor.on_idle(), 1);
    assert_eq!(editor.state(), ReconcileState::Reconciling);
    assert_eq!(editor.reconcile_count(), 1);
    assert!(editor.version() > version);

    // Tick 2: caret restored, back to clean.
    assert_eq!(editor.on_idle(), 1);
    assert_eq!(editor.state(), ReconcileState::Clean);
    assert_eq!(editor.caret_offset(), caret);
    assert_eq!(editor.caret(), PagePosition::new(1, 2));
    assert_eq!(editor.pending_idle_tasks(), 0);
}

#[test]
fn test_check_during_reconcile_is_deferred() {
    let mut editor = PagedEditor::default();
    editor.set_document_text(&two_page_text());

    editor.report_measured_page_height(0, 1500.0);
    editor.report_measured_page_height(1, 1500.0);
    assert_eq!(editor.pending_idle_tasks(), 2);

    // Page 0 starts a reconcile; the page 1 check is pushed to the next tick.
    assert_eq!(editor.on_idle(), 2);
    assert_eq!(editor.reconcile_count(), 1);
    assert_eq!(editor.pending_idle_tasks(), 2);

    // Caret restore runs, then the deferred check sees an unmeasured page.
    assert_eq!(editor.on_idle(), 2);
    assert_eq!(editor.state(), ReconcileState::Clean);
    assert_eq!(editor.reconcile_count(), 1);
    assert_eq!(editor.pending_idle_tasks(), 0);
}

#[test]
fn test_fitting_page_is_a_no_op() {
    let mut editor = PagedEditor::default();
    editor.set_document_text("short");
    let version = editor.version();
    let pages = editor.pages().to_vec();

    for _ in 0..2 {
        editor.report_measured_page_height(0, 500.0);
        assert_eq!(editor.on_idle(), 1);
        assert_eq!(editor.version(), version);
        assert_eq!(editor.pages(), pages.as_slice());
        assert_eq!(editor.reconcile_count(), 0);
        assert_eq!(editor.state(), ReconcileState::Clean);
    }
}

#[test]
fn test_tolerance_absorbs_small_overshoot() {
    let mut editor = PagedEditor::default();
    editor.set_document_text("short");
    let content = editor.geometry().content_height();

    editor.report_measured_page_height(0, content + 10.0);
    editor.on_idle();
    assert_eq!(editor.reconcile_count(), 0);

    editor.report_measured_page_height(0, content + 10.5);
    editor.on_idle();
    assert_eq!(editor.reconcile_count(), 1);
}

#[test]
fn test_edit_schedules_overflow_check() {
    let mut editor = PagedEditor::default();
    editor.set_document_text("abc");
    assert!(editor.edit_page(0, "abcd", 4));
    assert_eq!(editor.state(), ReconcileState::Editing);
    assert_eq!(editor.pending_idle_tasks(), 1);

    editor.on_idle();
    assert_eq!(editor.state(), ReconcileState::Clean);
}

#[test]
fn test_unmeasured_oversized_line_is_not_reconciled() {
    let line = "x".repeat(4000);
    let mut editor = PagedEditor::default();
    editor.set_document_text(&line);
    assert_eq!(editor.page_count(), 1);

    for round in 1..=3 {
        let text = format!("{line}{}", "y".repeat(round));
        assert!(editor.edit_page(0, &text, text.chars().count()));
        let version = editor.version();

        editor.on_idle();
        assert_eq!(editor.reconcile_count(), 0);
        assert_eq!(editor.version(), version);
        assert_eq!(editor.state(), ReconcileState::Clean);
        assert_eq!(editor.pending_idle_tasks(), 0);
    }
}

#[test]
fn test_color_change_keeps_pages() {
    let mut editor = PagedEditor::default();
    editor.set_document_text(&two_page_text());
    let version = editor.version();

    let mut recolored = editor.formatting().clone();
    recolored.set_text_color(Color::rgb(0x20, 0x20, 0x20));
    assert!(editor.set_formatting_settings(recolored.clone()));
    assert_eq!(editor.version(), version);
    assert_eq!(editor.formatting(), &recolored);
    assert!(!editor.set_formatting_settings(recolored));

    let mut resized = editor.formatting().clone();
    resized.set_font_size(20);
    assert!(editor.set_formatting_settings(resized));
    assert!(editor.version() > version);
}

#[test]
fn test_formatting_change_preserves_caret_offset() {
    let text = vec!["some words on a line"; 120].join("\n");
    let mut editor = PagedEditor::default();
    editor.set_document_text(&text);
    editor.set_caret(1, 10);
    let caret = editor.caret_offset();
    let pages_before = editor.page_count();

    assert!(editor.set_formatting("Georgia", 24, 2.0));
    assert!(editor.page_count() > pages_before);
    assert_eq!(editor.caret_offset(), caret);
    assert_eq!(editor.document_text(), text);

    assert!(!editor.set_formatting("Georgia", 24, 2.0));
}

#[test]
fn test_events_arrive_pages_then_caret() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);

    let mut editor = PagedEditor::default();
    editor.subscribe(move |event| {
        let entry = match event {
            SurfaceEvent::PagesChanged { pages, .. } => format!("pages:{}", pages.len()),
            SurfaceEvent::CaretMoved(position) => {
                format!("caret:{}:{}", position.page_index, position.local_offset)
            }
        };
        sink.lock().unwrap().push(entry);
    });

    editor.set_document_text("ab");
    editor.edit_page(0, "abc", 3);

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            "pages:1".to_string(),
            "caret:0:0".to_string(),
            "pages:1".to_string(),
            "caret:0:3".to_string(),
        ]
    );
}
