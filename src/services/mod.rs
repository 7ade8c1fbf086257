pub mod disclosure;
pub mod failure_writer;
pub mod result_writer;
pub mod segmenter;

pub use disclosure::DisclosureScanner;
pub use failure_writer::FailureWriter;
pub use result_writer::ResultWriter;
pub use segmenter::SectionSegmenter;
