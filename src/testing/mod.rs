pub mod dummies;
pub mod probes;
