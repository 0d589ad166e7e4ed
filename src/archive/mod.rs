// Archive access: streaming the top-level package and scanning nested JARs.

pub mod jar;
pub mod walker;
