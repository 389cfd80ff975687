use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use textos_core::{
    FormattingSettings, PageGeometry, Paginator, join_pages, paginate, to_absolute, to_page_local,
};

fn random_text(rng: &mut StdRng, max_lines: usize) -> String {
    const ALPHABET: &[char] = &['a', 'b', ' ', 'é', '中', '😀', 'x', 'y'];
    let lines = rng.gen_range(0..max_lines);
    let mut out = String::new();
    for i in 0..lines {
        if i > 0 {
            out.push('\n');
        }
        let len = rng.gen_range(0..200);
        for _ in 0..len {
            out.push(ALPHABET[rng.gen_range(0..ALPHABET.len())]);
        }
    }
    out
}

#[test]
fn test_empty_text_is_one_empty_page() {
    assert_eq!(paginate("", &FormattingSettings::default(), 1003.0), vec![String::new()]);
}

#[test]
fn test_two_lines_per_page_scenario() {
    let pages = paginate(
        "Line1\nLine2\nLine3",
        &FormattingSettings::default(),
        48.0,
    );
    assert_eq!(pages, vec!["Line1\nLine2".to_string(), "Line3".to_string()]);
}

#[test]
fn test_trailing_newlines_survive() {
    let text = "a\n\n\n";
    let pages = paginate(text, &FormattingSettings::default(), 48.0);
    assert_eq!(pages, vec!["a\n".to_string(), "\n".to_string()]);
    assert_eq!(join_pages(&pages), text);
}

#[test]
fn test_oversized_line_is_alone_on_its_page() {
    // 4000 chars * 8px = 32000px -> 48 wrapped rows * 24px, taller than the 1003px box.
    let long = "w".repeat(4000);
    let text = format!("a\n{long}\nb");
    let pages = Paginator::default().paginate_to_pages(&text, &FormattingSettings::default());
    assert_eq!(pages, vec!["a".to_string(), long, "b".to_string()]);
}

#[test]
fn test_a4_page_holds_forty_one_default_lines() {
    let text = vec!["line"; 100].join("\n");
    let paginator = Paginator::new(PageGeometry::A4);
    let pages = paginator.paginate_to_pages(&text, &FormattingSettings::default());
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].split('\n').count(), 41);
    assert_eq!(pages[1].split('\n').count(), 41);
    assert_eq!(pages[2].split('\n').count(), 18);
}

#[test]
fn test_larger_font_makes_more_pages() {
    let text = vec!["some words on a line"; 200].join("\n");
    let small = FormattingSettings::new("Segoe UI", 12, 1.5);
    let large = FormattingSettings::new("Segoe UI", 24, 1.5);
    let paginator = Paginator::default();
    assert!(
        paginator.paginate_to_pages(&text, &large).len()
            > paginator.paginate_to_pages(&text, &small).len()
    );
}

#[test]
fn test_randomized_join_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x7e_0705);
    let formatting = FormattingSettings::default();
    for _ in 0..200 {
        let text = random_text(&mut rng, 60);
        let content_height = rng.gen_range(10.0..400.0);
        let pages = paginate(&text, &formatting, content_height);
        assert!(!pages.is_empty());
        assert_eq!(pages.join("\n"), text);
    }
}

#[test]
fn test_randomized_offset_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let formatting = FormattingSettings::default();
    for _ in 0..50 {
        let text = random_text(&mut rng, 30);
        let pages = paginate(&text, &formatting, 120.0);
        let len = text.chars().count();
        for offset in 0..=len {
            let position = to_page_local(&pages, offset);
            assert_eq!(
                to_absolute(&pages, position.page_index, position.local_offset),
                offset
            );
        }
        // Past the end clamps to the end of the last page.
        let end = to_page_local(&pages, len + 10);
        assert_eq!(end.page_index, pages.len() - 1);
        assert_eq!(
            to_absolute(&pages, end.page_index, end.local_offset),
            len
        );
    }
}
