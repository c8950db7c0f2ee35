// dcx: review analytics for local stores
//
// This is the library root. Each module is one stage or surface of the
// analytics pipeline: datasets in, text processing, the analyses, and the
// outputs a dashboard renders.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod db;
pub mod output;
pub mod pipeline;
pub mod sentiment;
pub mod session;
pub mod text;
pub mod topics;
