// Services layer - query shaping, access rules, credentials and rendering
pub mod code_generator;
pub mod export;
pub mod password_hasher;
pub mod permission_gate;
pub mod query_composer;
pub mod token_service;
pub mod visibility_scoper;

pub use code_generator::{CodeGenerator, RandomSampler, SuffixSampler};
pub use export::CsvExporter;
pub use password_hasher::PasswordHasher;
pub use permission_gate::PermissionGate;
pub use query_composer::{ComposedQuery, ListQuery, Page, QueryComposer};
pub use token_service::TokenService;
pub use visibility_scoper::{Comparator, FilterValue, Predicate, VisibilityScope, scope_for};
