// Topic modeling — a trainer trait, the default LDA sampler, and the model.

pub mod lda;
pub mod model;
pub mod traits;
