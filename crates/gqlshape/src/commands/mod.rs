pub mod generate;
pub mod introspect;
