pub mod caller;
pub mod cli;
pub mod clinical;
pub mod ctx;
pub mod depth;
pub mod fallback;
pub mod io;
pub mod math;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod schema;
pub mod thresholds;
