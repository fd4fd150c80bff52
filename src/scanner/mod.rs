pub mod candidate;
pub mod eligibility;
pub mod extractor;
pub mod features;
pub mod keywords;
pub mod required;
pub mod scorer;

pub use candidate::*;
pub use eligibility::*;
pub use extractor::*;
pub use features::*;
pub use keywords::passes_keyword_gate;
pub use required::*;
pub use scorer::*;
