use emote_core::{EmoteFilter, IdentifyScope};
use emote_error::BatchErrorKind;
use emote_social::{Command, HELP_TEXT, parse_command, split_args};

fn parse(content: &str) -> Command {
    parse_command("em/", content)
        .expect("recognised command")
        .expect("valid arguments")
}

#[test]
fn test_messages_without_prefix_are_ignored() {
    assert!(parse_command("em/", "hello there").is_none());
    assert!(parse_command("em/", "em/").is_none());
    assert!(parse_command("em/", "em/frobnicate").is_none());
}

#[test]
fn test_aliases_map_to_the_same_command() {
    for alias in ["add", "create", "steal", "ADD"] {
        assert_eq!(
            parse(&format!("em/{alias} blob https://e.com/b.png")),
            Command::Add(vec!["blob".to_string(), "https://e.com/b.png".to_string()])
        );
    }
    for alias in ["remove", "delete", "rm", "del"] {
        assert_eq!(
            parse(&format!("em/{alias} a b")),
            Command::Remove(vec!["a".to_string(), "b".to_string()])
        );
    }
    assert_eq!(parse("em/addthese x"), parse("em/add-these x"));
    assert_eq!(parse("em/ls"), Command::List(EmoteFilter::All));
}

#[test]
fn test_filters_parse_and_default_to_all() {
    assert_eq!(parse("em/export"), Command::Export(EmoteFilter::All));
    assert_eq!(parse("em/export animated"), Command::Export(EmoteFilter::Animated));
    assert_eq!(parse("em/list static"), Command::List(EmoteFilter::Static));

    let err = parse_command("em/", "em/export moving").unwrap().unwrap_err();
    assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));
}

#[test]
fn test_rename_requires_two_arguments() {
    assert_eq!(
        parse(r#"em/mv old "new name""#),
        Command::Rename {
            old: "old".to_string(),
            new: "new name".to_string()
        }
    );
    let err = parse_command("em/", "em/rename only").unwrap().unwrap_err();
    assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));
}

#[test]
fn test_import_takes_optional_url() {
    assert_eq!(parse("em/import"), Command::Import(None));
    assert_eq!(
        parse("em/import https://e.com/a.zip"),
        Command::Import(Some("https://e.com/a.zip".to_string()))
    );
}

#[test]
fn test_show_and_archive_aliases() {
    for alias in ["show", "big", "embiggen"] {
        assert_eq!(
            parse(&format!("em/{alias} blob")),
            Command::Show(Some("blob".to_string()))
        );
    }
    assert_eq!(parse("em/show"), Command::Show(None));
    assert_eq!(parse("em/html"), Command::Archive);
    assert_eq!(parse("em/archive").name(), "archive");
}

#[test]
fn test_identify_scope_defaults_to_all() {
    let link = "https://discord.com/channels/1/2/3";
    assert_eq!(
        parse(&format!("em/identify {link}")),
        Command::Identify {
            url: link.to_string(),
            scope: IdentifyScope::All
        }
    );
    assert_eq!(
        parse(&format!("em/identify {link} reaction")),
        Command::Identify {
            url: link.to_string(),
            scope: IdentifyScope::Reaction
        }
    );

    let err = parse_command("em/", "em/identify").unwrap().unwrap_err();
    assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));
    let err = parse_command("em/", &format!("em/identify {link} nowhere"))
        .unwrap()
        .unwrap_err();
    assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));
}

#[test]
fn test_split_args_keeps_quoted_text() {
    assert_eq!(
        split_args(r#"a "b c"  d"#),
        vec!["a".to_string(), "b c".to_string(), "d".to_string()]
    );
}

#[test]
fn test_help_mentions_every_command() {
    for name in [
        "add", "add-these", "export", "import", "remove", "rename", "list", "stats", "show",
        "identify", "archive",
    ] {
        assert!(HELP_TEXT.contains(&format!("`{name}")), "{name} missing from help");
    }
    assert_eq!(parse("em/stats").name(), "stats");
}
