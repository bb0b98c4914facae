mod assembly;
mod inspect;

pub use assembly::Assembly;
pub use inspect::inspect;
