pub mod mutation_guard;

pub use mutation_guard::MutationGuard;
