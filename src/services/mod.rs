//! Services layer - Business logic
//!
//! Services own the rules: prompt construction, provider dispatch and
//! fallback, parsing of model replies, the saved product library and
//! exports. Repositories and providers are injected as trait objects.

pub mod export;
pub mod generation;
pub mod library;
pub mod pain_points;
pub mod parser;
pub mod password;
pub mod prompt;
pub mod providers;
pub mod rate_limiter;
pub mod social;
pub mod trending;
pub mod user;

pub use export::{export_filename, ExportContent, ExportError, ExportOutput, ExportService, Exportable};
pub use generation::{ComprehensiveResult, GenerationError, GenerationOptions, GenerationService};
pub use library::{LibraryError, LibraryService};
pub use pain_points::PainPointService;
pub use parser::ContentParser;
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use social::SocialService;
pub use trending::TrendingService;
pub use user::{UserService, UserServiceError};
