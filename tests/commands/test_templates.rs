//! Tests for template file handling across accounts

use std::fs;

use moontele::templates::{self, TemplateStore};
use moontele::{Error, Target, TargetKind};

#[test]
fn test_legacy_file_migrates_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target_templates.json");
    fs::write(
        &path,
        r#"{"promo": [{"chat_id": 9, "chat_title": "Nine", "topic_id": 2,
                      "topic_title": "General", "type": "Group/Channel"}]}"#,
    )
    .unwrap();

    let store = TemplateStore::new(&path);
    let first = store.load("+7").unwrap();
    assert_eq!(first["promo"][0].topic_title.as_deref(), Some("General"));

    // Already migrated: other accounts see nothing.
    assert!(store.load("+8").unwrap().is_empty());
    assert_eq!(store.load("+7").unwrap(), first);
}

#[test]
fn test_edit_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = TemplateStore::new(dir.path().join("t.json"));

    let mut saved = store.load("+1").unwrap();
    templates::create(
        &mut saved,
        "team",
        vec![
            Target::new(1, "A", TargetKind::User),
            Target::new(2, "B", TargetKind::Group),
        ],
        false,
    )
    .unwrap();
    templates::add_target(&mut saved, "team", Target::new(3, "C", TargetKind::Channel)).unwrap();
    templates::remove_target(&mut saved, "team", 1).unwrap();
    store.save("+1", &saved).unwrap();

    let reloaded = store.load("+1").unwrap();
    let ids: Vec<i64> = reloaded["team"].iter().map(|t| t.chat_id).collect();
    assert_eq!(ids, vec![2, 3]);

    let mut reloaded = reloaded;
    templates::delete(&mut reloaded, "team").unwrap();
    assert!(matches!(
        templates::delete(&mut reloaded, "team"),
        Err(Error::TemplateNotFound(_))
    ));
}
