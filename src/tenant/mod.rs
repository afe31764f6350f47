pub mod directory;
pub mod hostname;
pub mod resolver;
pub mod slug;

pub use directory::{MemoryTenantDirectory, PgTenantDirectory, TenantDirectory};
pub use resolver::{Resolution, ResolutionMethod, ResolveInput, TenantContext};
