pub mod text_loader;

pub use text_loader::{load_all_documents, load_text_document};
