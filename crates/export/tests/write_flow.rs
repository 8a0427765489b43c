use pretty_assertions::assert_eq;
use shortcut_export::{
    write_shortcut, write_shortcut_with, ExportConfig, ExportError, SignMode, Signer, StatsStore,
};
use shortcut_model::{
    Action, Attachment, ContainerFormat, IdSource, SequentialIds, Shortcut, TokenString,
    TokenValue,
};
use std::path::Path;

fn config_in(dir: &Path) -> ExportConfig {
    ExportConfig {
        output_dir: dir.join("out"),
        format: ContainerFormat::Binary,
        sign_mode: SignMode::Off,
        open_after_write: false,
        stats_path: dir.join("stats.json"),
    }
}

fn greeting() -> Shortcut {
    let mut ids = SequentialIds::new();
    let text_id = ids.next_id();
    Shortcut::builder("Greeting / Demo")
        .action(
            Action::new("is.workflow.actions.gettext")
                .with_uuid(&text_id)
                .with_token("WFTextActionText", "hello"),
        )
        .action(
            Action::new("is.workflow.actions.showresult")
                .with_uuid(ids.next_id())
                .with_token(
                    "Text",
                    TokenValue::Composite(TokenString::single(Attachment::action_output(
                        &text_id, "Text",
                    ))),
                ),
        )
        .build()
}

#[test]
fn writes_binary_file_that_decodes_back() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = write_shortcut(&greeting(), &config_in(dir.path())).unwrap();

    assert_eq!(outcome.path, dir.path().join("out/Greeting _ Demo.shortcut"));
    assert_eq!(outcome.action_count, 2);
    assert!(!outcome.signed);
    assert!(outcome.warnings.is_empty());

    let bytes = std::fs::read(&outcome.path).unwrap();
    assert!(bytes.starts_with(b"bplist00"));
    assert_eq!(bytes.len() as u64, outcome.bytes_written);
    assert_eq!(Shortcut::decode(&bytes).unwrap(), greeting());
}

#[test]
fn xml_format_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.format = ContainerFormat::Xml;
    let outcome = write_shortcut(&greeting(), &config).unwrap();
    let text = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(text.starts_with("<?xml"));
}

#[test]
fn dangling_reference_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let broken = Shortcut::builder("Broken")
        .action(Action::new("is.workflow.actions.showresult").with_token(
            "Text",
            TokenValue::Reference(Attachment::action_output("MISSING", "Text")),
        ))
        .build();
    let err = write_shortcut(&broken, &config_in(dir.path())).unwrap_err();
    assert!(matches!(err, ExportError::InvalidReference(_)));
    assert_eq!(err.code(), "invalid_reference");
    assert!(!dir.path().join("out/Broken.shortcut").exists());
}

#[test]
fn failed_signing_falls_back_to_unsigned_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.sign_mode = SignMode::Anyone;
    let signer = Signer::with_program(dir.path().join("missing-signer"));

    let outcome = write_shortcut_with(&greeting(), &config, &signer).unwrap();
    assert!(!outcome.signed);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("unsigned"));
    let bytes = std::fs::read(&outcome.path).unwrap();
    assert_eq!(Shortcut::decode(&bytes).unwrap(), greeting());
    assert_eq!(entries(&dir.path().join("out")), vec!["Greeting _ Demo.shortcut"]);
}

#[cfg(unix)]
#[test]
fn successful_signing_replaces_unsigned_output() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fake-signer");
    // argv: sign --mode <m> --input <in> --output <out>
    std::fs::write(&script, "#!/bin/sh\ncp \"$5\" \"$7\"\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = config_in(dir.path());
    config.sign_mode = SignMode::PeopleWhoKnowMe;
    let outcome = write_shortcut_with(&greeting(), &config, &Signer::with_program(&script)).unwrap();

    assert!(outcome.signed, "warnings: {:?}", outcome.warnings);
    assert!(outcome.warnings.is_empty());
    assert!(outcome.path.exists());
    assert_eq!(entries(&dir.path().join("out")), vec!["Greeting _ Demo.shortcut"]);
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[test]
fn concurrent_writes_to_one_name_leave_a_complete_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let shortcut = greeting();
    let (shared, config) = (&shortcut, &config);

    std::thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    (0..20)
                        .map(|_| write_shortcut(shared, config))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            for result in handle.join().unwrap() {
                assert!(result.is_ok(), "write failed: {result:?}");
            }
        }
    });

    let out = dir.path().join("out");
    assert_eq!(entries(&out), vec!["Greeting _ Demo.shortcut"]);
    let bytes = std::fs::read(out.join("Greeting _ Demo.shortcut")).unwrap();
    assert_eq!(Shortcut::decode(&bytes).unwrap(), shortcut);
}

#[test]
fn stats_follow_generations() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let store = StatsStore::new(&config.stats_path);
    assert_eq!(store.load().unwrap().total_generated, 0);

    write_shortcut(&greeting(), &config).unwrap();
    store.record("text-pipeline").unwrap();
    let stats = store.record("raw").unwrap();
    assert_eq!(stats.total_generated, 2);
    assert!(stats.last_generated_at_ms.is_some());
}
