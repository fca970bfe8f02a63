mod extract_use_case;

pub use extract_use_case::{ExtractSummary, ExtractUseCase, FaceSink, NullFaceSink};
