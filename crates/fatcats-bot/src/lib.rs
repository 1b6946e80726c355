pub mod policy;

pub use policy::{GreedyPolicy, Policy, PolicyContext, PolicyError, RandomPolicy};
