// src/store/mod.rs
//
// Process-lifetime repositories, one per entity. Every mutation goes through
// the owning repository's write path; nothing mutates a shared collection as
// a side effect of an unrelated write.

pub mod institute_store;
pub mod paper_store;
pub mod question_bank;
pub mod result_store;
pub mod test_store;

pub use institute_store::InstituteStore;
pub use paper_store::PaperStore;
pub use question_bank::QuestionBank;
pub use result_store::ResultStore;
pub use test_store::TestStore;
