pub mod advisory;
pub mod batch_report;
pub mod document;
pub mod loaders;
pub mod paper_record;
pub mod section;

pub use advisory::{Advisory, DisclosureSignal, DocumentAdvisory};
pub use batch_report::{BatchReport, DocumentFailure, FailureKind};
pub use document::{clean_text, Document};
pub use loaders::{load_all_documents, load_text_document};
pub use paper_record::{EvidenceLevel, PaperRecord};
pub use section::{Section, SectionSet};
