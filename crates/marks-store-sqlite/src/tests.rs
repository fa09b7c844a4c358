//! Integration tests for `SqliteStore` against an in-memory database.

use marks_core::{
  gradebook::{Gradebook, Year},
  record::{Category, CourseRecord, FieldEdit, Requirement},
  store::GradebookStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sample_book() -> Gradebook {
  let mut book = Gradebook::new();
  let id = book.add_record(Year::First).unwrap();
  book.edit(Year::First, id, FieldEdit::Subject("Algorithms".into())).unwrap();
  book.edit(Year::First, id, FieldEdit::Category(Category::Major)).unwrap();
  book.edit(Year::First, id, FieldEdit::Requirement(Requirement::Required)).unwrap();
  book.edit(Year::First, id, FieldEdit::Credit(3)).unwrap();
  book.edit(Year::First, id, FieldEdit::Midterm(28)).unwrap();

  let mut pf = CourseRecord::new();
  pf.subject = "Seminar".into();
  pf.apply(FieldEdit::Credit(1));
  pf.apply(FieldEdit::Final(50));
  book.insert(Year::Third, pf).unwrap();
  book
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_without_blob_is_empty() {
  let s = store().await;
  let book = s.load().await.unwrap();
  assert_eq!(book, Gradebook::new());
  assert!(s.raw_blob().await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_blob_falls_back_to_empty() {
  let s = store().await;
  s.put_raw("{not json").await.unwrap();
  assert_eq!(s.load().await.unwrap(), Gradebook::new());

  s.put_raw(r#"{"1": [{"id": 5}]}"#).await.unwrap();
  assert_eq!(s.load().await.unwrap(), Gradebook::new());
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_reload() {
  let s = store().await;
  let book = sample_book();
  s.save(&book).await.unwrap();

  let loaded = s.load().await.unwrap();
  assert_eq!(loaded, book);
  assert_eq!(loaded.records(Year::First)[0].subject, "Algorithms");
  assert_eq!(loaded.records(Year::Third)[0].final_exam, 50);
}

#[tokio::test]
async fn save_overwrites_previous_blob() {
  let s = store().await;
  s.save(&sample_book()).await.unwrap();

  let mut book = s.load().await.unwrap();
  book.commit();
  let id = book.records(Year::Third)[0].id;
  book.remove(Year::Third, id);
  s.save(&book).await.unwrap();

  let loaded = s.load().await.unwrap();
  assert!(loaded.records(Year::Third).is_empty());
  assert_eq!(loaded.records(Year::First).len(), 1);
  assert!(loaded.records(Year::First)[0].grade.is_some());
}

#[tokio::test]
async fn raw_blob_is_keyed_by_year_number() {
  let s = store().await;
  s.save(&sample_book()).await.unwrap();

  let raw = s.raw_blob().await.unwrap().unwrap();
  let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
  let years = value.as_object().unwrap();
  assert_eq!(years.len(), 3);
  assert_eq!(years["3"][0]["subject"], "Seminar");
}

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("marks-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  let book = sample_book();
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.save(&book).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.load().await.unwrap(), book);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn raw_blob_is_what_save_wrote() {
  let s = store().await;
  let book = sample_book();
  s.save(&book).await.unwrap();
  assert_eq!(s.raw_blob().await.unwrap(), Some(book.to_json().unwrap()));
}
