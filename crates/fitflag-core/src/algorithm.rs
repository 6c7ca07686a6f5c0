// Wire names of the estimator variants, shared by every flag that selects
// between them.

pub const SIMPLE: &str = "simple";
pub const ENHANCED: &str = "enhanced";
pub const ML_POWERED: &str = "ml-powered";
