pub mod domain;
pub mod ports;

pub use domain::{
    Agency, AgencyLocation, AgencyMetadata, Conversation, ConversationSummary, Exchange,
    InlineImage, ProfileUpdate, SenderRole, UserProfile, VectorMatch, VectorRecord,
};
pub use ports::{
    AgencyCatalog, DatabaseService, EmbeddingService, GenerationService, PortError, PortResult,
    TitleGenerationService, VectorIndexService,
};
