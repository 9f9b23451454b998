pub mod local;
pub mod memory;

#[cfg(test)]
mod tests_local;

pub use local::LocalVfs;
pub use memory::MemoryVfs;
