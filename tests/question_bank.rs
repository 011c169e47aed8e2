use cheatsheet_quiz::error::BankError;
use cheatsheet_quiz::models::bank::{BankQuestion, BANK_VERSION};
use cheatsheet_quiz::models::Question;
use cheatsheet_quiz::services::{BankStatus, QuestionBank};
use std::fs;
use std::thread;

const RAW_BANK: &str = r#"{
  "meta": { "title": "OWASP Top 10 2021", "author": "training team", "count": 4 },
  "questions": [
    {
      "topic": "A01: Broken Access Control",
      "difficulty": "easy",
      "question": "What does IDOR stand for?",
      "options": ["Insecure Direct Object Reference", "Input Data Overflow Risk", "Internal DNS Override", "Indirect Device Ownership"],
      "answer": 0,
      "explanation": "IDOR exposes objects by identifier.",
      "tags": ["idor"],
      "source": "https://owasp.org/Top10/A01"
    },
    {
      "topic": "A01: Broken Access Control",
      "difficulty": "easy",
      "question": "What does IDOR stand for?",
      "options": ["a", "b", "c", "d"],
      "answer": 3,
      "explanation": "duplicate",
      "tags": [],
      "source": "https://owasp.org/Top10/A01"
    },
    {
      "topic": "A03: Injection",
      "difficulty": "medium",
      "question": "Which defense stops SQL injection?",
      "options": ["Escaping output", "Parameterized queries", "CAPTCHA", "Rate limiting"],
      "answer": 1,
      "explanation": "Bind variables keep data out of the query.",
      "tags": ["sqli"],
      "source": "https://owasp.org/Top10/A03"
    },
    {
      "topic": "General",
      "difficulty": "hard",
      "question": "What is defense in depth?",
      "options": ["Layered controls", "One firewall", "Obscurity", "Backups"],
      "answer": 0,
      "explanation": "",
      "tags": [],
      "source": "https://owasp.org"
    }
  ]
}"#;

fn question(category_id: &str, n: usize) -> BankQuestion {
    BankQuestion {
        id: format!("{}-{}", category_id, n),
        category_id: category_id.to_string(),
        category: format!("{}: Category", category_id),
        stem: format!("Question {} of {}?", n, category_id),
        options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
        answer_index: 1,
        source: format!("Source {}", category_id),
        url: format!("https://example.org/{}", category_id),
        explanation: String::new(),
        generated: "2025-01-01T00:00:00Z".to_string(),
    }
}

#[test]
fn test_open_raw_bank_converts_and_dedups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    fs::write(&path, RAW_BANK).unwrap();

    let bank = QuestionBank::open(&path).unwrap();
    assert_eq!(bank.status(), BankStatus::Populated);

    let stats = bank.stats();
    assert_eq!(stats["A01"], 1);
    assert_eq!(stats["A03"], 1);
    assert_eq!(stats["General"], 1);

    let meta = bank.metadata();
    let keys: Vec<&str> = meta.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["title", "author", "count"]);

    let categories = bank.categories();
    let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["A01", "A03", "General"]);
    assert_eq!(categories[0].name, "A01: Broken Access Control");

    let sheets = bank.cheat_sheets();
    let titles: Vec<&str> = sheets.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Broken Access Control", "Injection", "OWASP"]);

    let served = bank.get_random(&["A01"], 5, 1);
    assert_eq!(served.len(), 1);
    assert_eq!(served[0].answer_index, 0);
    assert_eq!(
        served[0].explanation.as_deref(),
        Some("IDOR exposes objects by identifier.")
    );
}

#[test]
fn test_persist_then_reopen_keeps_canonical_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bank.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, RAW_BANK).unwrap();

    let bank = QuestionBank::open(&path).unwrap();
    let ids_before: Vec<String> = bank
        .get_random(&["A01", "A03", "General"], 10, 9)
        .into_iter()
        .map(|q| q.id)
        .collect();
    bank.persist().unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"version\""));
    assert!(written.contains("\"meta\""));

    // 保存后的文件同时带有 version 和 meta，应按已转换格式读取，ID 不变
    let reopened = QuestionBank::open(&path).unwrap();
    assert_eq!(reopened.snapshot().version, BANK_VERSION);
    let ids_after: Vec<String> = reopened
        .get_random(&["A01", "A03", "General"], 10, 9)
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids_before, ids_after);
}

#[test]
fn test_reload_discards_unsaved_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");

    let bank = QuestionBank::open(&path).unwrap();
    assert_eq!(bank.status(), BankStatus::Empty);

    bank.set("A05", vec![question("A05", 1)]);
    bank.persist().unwrap();
    bank.add("A05", vec![question("A05", 2)]);
    assert_eq!(bank.stats()["A05"], 2);

    bank.reload().unwrap();
    assert_eq!(bank.stats()["A05"], 1);
}

#[test]
fn test_failed_persist_keeps_mutation() {
    let dir = tempfile::tempdir().unwrap();
    // 目标路径是一个目录，写入必然失败
    let path = dir.path().join("occupied");
    fs::create_dir_all(&path).unwrap();

    let bank = QuestionBank::open(dir.path().join("missing.json")).unwrap();
    assert!(bank.is_empty());

    let blocked = QuestionBank::open(&path);
    assert!(matches!(blocked, Err(BankError::Io { .. })));

    let bank_on_dir = {
        let file = dir.path().join("bank.json");
        let bank = QuestionBank::open(&file).unwrap();
        fs::create_dir_all(&file).unwrap();
        bank
    };
    bank_on_dir.add("A07", vec![question("A07", 1)]);
    let err = bank_on_dir.persist().unwrap_err();
    assert!(matches!(err, BankError::Io { .. }));
    assert_eq!(bank_on_dir.stats()["A07"], 1);
    assert_eq!(bank_on_dir.status(), BankStatus::Populated);
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    fs::write(&path, r#"{ "items": [] }"#).unwrap();

    assert!(matches!(
        QuestionBank::open(&path),
        Err(BankError::UnknownFormat)
    ));
}

#[test]
fn test_get_random_is_reproducible() {
    let bank = QuestionBank::in_memory();
    bank.set("A01", (0..15).map(|n| question("A01", n)).collect());
    bank.set("A02", (0..15).map(|n| question("A02", n)).collect());

    let first = bank.get_random(&["A01", "A02"], 12, 2024);
    let second = bank.get_random(&["A01", "A02"], 12, 2024);
    assert_eq!(first.len(), 12);
    assert_eq!(first, second);

    let other_seed = bank.get_random(&["A01", "A02"], 12, 2025);
    assert_ne!(first, other_seed);

    assert!(bank.get_random(&["A09"], 5, 1).is_empty());
    assert_eq!(bank.get_random(&["A01", "A01"], 100, 1).len(), 15);
}

#[test]
fn test_concurrent_add_and_set_lose_nothing() {
    let bank = QuestionBank::in_memory();

    thread::scope(|scope| {
        for worker in 0..8 {
            let bank = &bank;
            scope.spawn(move || {
                for n in 0..25 {
                    bank.add("shared", vec![question("shared", worker * 100 + n)]);
                }
                let own = format!("W{}", worker);
                bank.set(&own, (0..worker + 1).map(|n| question(&own, n)).collect());
            });
        }
    });

    let stats = bank.stats();
    assert_eq!(stats["shared"], 8 * 25);
    for worker in 0..8 {
        assert_eq!(stats[&format!("W{}", worker)], worker + 1);
    }
}

fn live_question(id: &str, category_id: &str) -> Question {
    Question {
        id: id.to_string(),
        stem: "Which of the following aligns with guidance from \"Logging Cheat Sheet\"?".to_string(),
        options: vec![
            "Log authentication failures".into(),
            "Disable audit trails".into(),
            "Store logs in the web root".into(),
            "Log raw session tokens".into(),
        ],
        answer_index: 0,
        source: "Logging Cheat Sheet".to_string(),
        url: "https://example.org/logging.html".to_string(),
        category: format!("{} – Logging", category_id),
        category_id: category_id.to_string(),
        explanation: None,
    }
}

#[test]
fn test_archive_skips_ids_already_stored() {
    let bank = QuestionBank::in_memory();
    let questions = vec![live_question("q-1", "A09"), live_question("q-2", "A09"), live_question("q-3", "A10")];

    assert_eq!(bank.archive(&questions, "2025-02-01T00:00:00Z"), 3);
    assert_eq!(bank.archive(&questions, "2025-02-02T00:00:00Z"), 0);

    let more = vec![live_question("q-3", "A10"), live_question("q-4", "A10"), live_question("q-4", "A10")];
    assert_eq!(bank.archive(&more, "2025-02-03T00:00:00Z"), 1);

    let stats = bank.stats();
    assert_eq!(stats["A09"], 2);
    assert_eq!(stats["A10"], 2);
    assert_eq!(bank.snapshot().generated, "2025-02-03T00:00:00Z");
}
