/// Round-trip tests: parse(serialize(board)) must keep board content
use crate::ast::*;
use crate::*;

fn assert_roundtrip(board: &Board) {
    let text = serialize(board);
    let reparsed = parse(&text);
    assert!(
        board.content_eq(&reparsed),
        "round-trip changed the board\n--- text ---\n{}\n--- before ---\n{:#?}\n--- after ---\n{:#?}",
        text,
        board,
        reparsed
    );
}

fn card(text: &str, description: &str, completed: bool) -> Card {
    Card {
        id: String::new(),
        text: text.to_string(),
        description: description.to_string(),
        completed,
    }
}

fn column(title: &str, auto_complete: Option<bool>, cards: Vec<Card>) -> Column {
    Column {
        id: String::new(),
        title: title.to_string(),
        cards,
        settings: ColumnSettings { auto_complete },
    }
}

#[test]
fn test_roundtrip_parsed_sources() {
    let sources = vec![
        "## Backlog\n\n- [ ] First task\n- [ ] Second task\n\n## In Progress\n\n## Done\n\n",
        "[no-thumbnails]\n\n## A\n\n",
        "# Title\n\nIntro paragraph\n\n## Todo\n- [ ] a\n  desc\n- [X] b\n## Done [AUTO-COMPLETE]\n- [x] c\n",
        "## Only\n- [ ] with [brackets] in text\n  - nested bullet\n    deeper\n",
        "",
        "\n# Title\n\n## A\n- [ ] x\n",
        "  indented intro\n## A\n",
        "[no-thumbnails]\n\n  indented intro\n\n## A\n",
    ];

    for source in sources {
        let board = parse(source);
        assert_roundtrip(&board);
    }
}

#[test]
fn test_roundtrip_constructed_board() {
    let board = Board {
        preamble: "Sprint 12\n\nGoals:\n  ship it".to_string(),
        columns: vec![
            column(
                "To Do",
                None,
                vec![
                    card("Design", "", false),
                    card("Build", "step one\n  sub step\nstep two", false),
                ],
            ),
            column("Review [team]", Some(false), vec![card("PR #12", "", true)]),
            column("Done", Some(true), vec![card("Kickoff", "notes", true)]),
        ],
        settings: BoardSettings {
            show_thumbnails: Some(false),
        },
    };

    assert_roundtrip(&board);
}

#[test]
fn test_serialize_is_idempotent() {
    let source = "Intro\n\n\n## A [auto-complete]\n\n\n- [X]   spaced   \n   three space indent\n\n## B\n";
    let once = serialize(&parse(source));
    let twice = serialize(&parse(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_auto_complete_column_roundtrip() {
    let board = parse("## Done [auto-complete]\n");
    assert_eq!(board.columns[0].title, "Done");
    assert_eq!(board.columns[0].settings.auto_complete, Some(true));
    assert_eq!(serialize(&board), "## Done [auto-complete]\n");
}

#[test]
fn test_uppercase_x_normalizes() {
    let board = parse("## A\n- [X] buy milk");
    assert!(board.columns[0].cards[0].completed);
    assert!(serialize(&board).contains("- [x] buy milk\n"));
}
