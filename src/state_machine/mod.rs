mod resource;
mod state;

pub use resource::ResourceDocument;
pub use state::ResourceState;
