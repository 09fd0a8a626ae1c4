mod decl;
mod declarations;
mod def;
mod schema;

// pub use all node types
pub use self::decl::*;
pub use self::declarations::*;
pub use self::def::*;
pub use self::schema::*;
