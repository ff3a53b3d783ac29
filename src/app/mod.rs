pub mod enrich_use_case;
pub mod inspect_use_case;
pub mod ports;

pub use enrich_use_case::{EnrichFileUseCase, JobReport};
pub use inspect_use_case::{FileInspection, FileMetadata, InspectFileUseCase};
